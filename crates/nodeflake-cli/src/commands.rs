use std::io::Write;

use anyhow::Context;
use nodeflake::{
    AtomicSnowflakeGenerator, LockSnowflakeGenerator, MonotonicClock, SnowflakeGenerator,
    SystemClock, TimeSource, UserIdGenerator, format_id,
};

use crate::config::{CliConfig, ClockKind, Command};

/// Runs the configured subcommand, writing its results to `out`.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate { count } => match config.clock {
            ClockKind::System => generate(config, SystemClock, *count, out),
            ClockKind::Monotonic => generate(config, MonotonicClock::new(), *count, out),
        },
        Command::Decode { ids } => decode(ids, out),
        Command::Node => {
            let node = config
                .node
                .resolve()
                .context("failed to resolve node identity")?;
            writeln!(out, "{node}")?;
            Ok(())
        }
    }
}

fn generate<T>(config: &CliConfig, time: T, count: i32, out: &mut impl Write) -> anyhow::Result<()>
where
    T: TimeSource,
{
    let node = config
        .node
        .resolve()
        .context("failed to resolve node identity")?;

    if config.lock_free {
        write_batch(AtomicSnowflakeGenerator::new(node, time), count, out)
    } else {
        write_batch(LockSnowflakeGenerator::new(node, time), count, out)
    }
}

fn write_batch<G>(generator: G, count: i32, out: &mut impl Write) -> anyhow::Result<()>
where
    G: SnowflakeGenerator,
{
    let generator = UserIdGenerator::from_generator(generator);
    let ids = generator
        .generate_user_ids(count)
        .context("failed to generate user ids")?;
    for id in ids {
        writeln!(out, "{id}")?;
    }
    Ok(())
}

fn decode(ids: &[i64], out: &mut impl Write) -> anyhow::Result<()> {
    for &id in ids {
        writeln!(out, "{}", format_id(id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use nodeflake::{DetectionPolicy, NodeConfig, parse_datacenter_id, parse_worker_id};

    use super::*;

    fn config(command: Command, clock: ClockKind, lock_free: bool) -> CliConfig {
        CliConfig {
            node: NodeConfig {
                worker_id: Some(3),
                datacenter_id: Some(5),
                detection: DetectionPolicy::Strict,
            },
            clock,
            lock_free,
            command,
        }
    }

    fn output(config: &CliConfig) -> String {
        let mut out = Vec::new();
        run(config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn generate_prints_one_id_per_line() {
        for (clock, lock_free) in [
            (ClockKind::System, false),
            (ClockKind::System, true),
            (ClockKind::Monotonic, false),
            (ClockKind::Monotonic, true),
        ] {
            let text = output(&config(Command::Generate { count: 25 }, clock, lock_free));
            let ids: Vec<i64> = text.lines().map(|line| line.parse().unwrap()).collect();
            assert_eq!(ids.len(), 25);
            assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(ids.iter().all(|&id| parse_worker_id(id) == 3));
            assert!(ids.iter().all(|&id| parse_datacenter_id(id) == 5));
        }
    }

    #[test]
    fn decode_prints_every_field() {
        let text = output(&config(
            Command::Decode {
                ids: vec![8_106_751_287_767_041, 0],
            },
            ClockKind::System,
            false,
        ));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "UserId { id: 8106751287767041, timestamp: 1706000000123 (2024-01-23T08:53:20.123Z), \
             datacenter_id: 5, worker_id: 3, sequence: 1 }"
        );
        assert!(lines[1].starts_with("UserId { id: 0, timestamp: 1704067200000 "));
    }

    #[test]
    fn node_prints_explicit_identity() {
        let text = output(&config(Command::Node, ClockKind::System, false));
        assert_eq!(text, "datacenter 5 / worker 3\n");
    }
}
