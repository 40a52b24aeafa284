//! A small arena session: mint, trade, fight, and replay.
//!
//! Run with `RUST_LOG=debug cargo run -p zombie-engine --example arena` to
//! see every accepted and rejected call.

use zombie_engine::prelude::*;

const DAY: u64 = 86_400;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let deployer = Account::derive("deployer");
    let alice = Account::derive("alice");
    let bob = Account::derive("bob");

    let config = RegistryConfig {
        rng_seed: 0x5EED,
        ..Default::default()
    };
    let registry = ZombieRegistry::deploy(deployer, config)?;
    let mut recorder = CallRecorder::new(registry);

    let session = [
        Call::CreateRandomZombie {
            caller: alice,
            name: "Zombie 1".into(),
        },
        Call::CreateRandomZombie {
            caller: alice,
            name: "Zombie 2".into(),
        },
        Call::TransferFrom {
            caller: alice,
            from: alice,
            to: bob,
            id: ZombieId(0),
        },
        Call::TransferFrom {
            caller: alice,
            from: alice,
            to: bob,
            id: ZombieId(0),
        },
        Call::CreateRandomZombie {
            caller: alice,
            name: "Zombie 1".into(),
        },
        Call::CreateRandomZombie {
            caller: bob,
            name: "Zombie 2".into(),
        },
        Call::AdvanceTime { secs: DAY },
        Call::Attack {
            caller: alice,
            attacker: ZombieId(1),
            defender: ZombieId(2),
        },
    ];

    for call in session {
        match recorder.execute(call) {
            Ok(events) => {
                for event in &events {
                    println!("{:?} {:?}", event.kind(), event.args());
                }
            }
            Err(err) => println!("rejected: {}", err.reason()),
        }
    }

    let (registry, log) = recorder.finish();

    for id in 0..registry.zombie_count() as u64 {
        let zombie = registry.zombie(ZombieId(id))?;
        println!(
            "{} {:<10} dna={} level={} wins={} losses={} owner={}",
            zombie.id,
            zombie.name,
            zombie.dna,
            zombie.level,
            zombie.win_count,
            zombie.loss_count,
            registry.owner_of(zombie.id)?,
        );
    }

    let result = replay(&log)?;
    println!(
        "replayed {} calls, diverged: {}",
        result.calls_replayed,
        result.first_divergence.is_some()
    );
    println!("state hash {}", registry.state_hash());
    Ok(())
}
