//! Basic physics simulation example
//!
//! This example demonstrates a ball falling onto a floor under gravity.
//! Run with `RUST_LOG=accel2d=debug` to see the world's log output.

use accel2d::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("accel2d - Basic Simulation Example");
    println!("==================================\n");

    // Create physics world with default settings
    let mut world = World::default();
    world.set_gravity(Vec2::new(0.0, -9.81));

    // Create a static floor
    world.add_body(RigidBody::rectangle(Vec2::new(10.0, 0.5)).with_infinite_mass());
    println!("Created floor at Y=0 (top surface at Y=0.5)");

    // Create a dynamic ball
    let ball = world.add_body(
        RigidBody::circle(0.5)
            .with_position(Vec2::new(0.0, 5.0))
            .with_mass(1.0)
            .with_restitution(0.5),
    );
    println!("Created ball at Y=5.0 (radius=0.5, restitution=0.5)\n");

    // Simulation parameters
    let dt = 1.0 / 60.0;
    let total_time = 3.0;
    let steps = (total_time / dt) as usize;

    println!("Simulating {} seconds ({} steps at {}Hz)...\n", total_time, steps, 1.0 / dt);

    for i in 0..steps {
        world.start_frame();
        world.advance(dt);

        for event in world.collision_events() {
            if event.kind != CollisionEventKind::Persisted {
                println!("t={:.2}s: {:?} {} / {}", i as f32 * dt, event.kind, event.pair.body_a, event.pair.body_b);
            }
        }

        // Print position every 30 frames (0.5 seconds)
        if i % 30 == 0 {
            if let Some(body) = world.body(ball) {
                let pos = body.position();
                let vel = body.linear_velocity;
                println!(
                    "t={:.2}s: position=({:.3}, {:.3}), velocity=({:.3}, {:.3})",
                    i as f32 * dt,
                    pos.x,
                    pos.y,
                    vel.x,
                    vel.y
                );
            }
        }
    }

    if let Some(body) = world.body(ball) {
        let pos = body.position();
        println!("\nFinal ball position: ({:.3}, {:.3})", pos.x, pos.y);
    }
    println!("Expected resting position: ~(0, 1.0) (floor top at 0.5 + ball radius 0.5)");
}
