use expiring_map::{ExpiringMap, Memoized, Ttl, TtlConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EGGS_TTL_MS: u64 = 500;
const MEMO_TTL_HOURS: i64 = 1;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let map = ExpiringMap::with_config(&TtlConfig::new().minutes(1))?;

    map.put("spam", 42, Ttl::Never);
    map.put("eggs", 2, Ttl::After(Duration::from_millis(EGGS_TTL_MS)));
    map.insert("beer", 100);

    println!("spam: {}", map.get("spam")?);
    println!("eggs: {}", map.get("eggs")?);
    println!("Map size: {}", map.len());

    println!("Waiting for eggs to expire...");
    std::thread::sleep(Duration::from_millis(EGGS_TTL_MS * 2));

    println!("eggs: {:?}", map.get_opt("eggs"));
    println!("spam: {}", map.get("spam")?);
    println!("beer popped: {:?}", map.pop("beer"));
    println!("Surviving keys: {:?}", map.keys());

    let power_tower = Memoized::new(
        |(x, n): (u64, u32)| {
            println!("  computing power tower of {} with {} levels", x, n);
            (0..n).fold(x, |acc, _| acc.saturating_mul(acc))
        },
        &TtlConfig::new().hours(MEMO_TTL_HOURS),
    )?;

    println!("First call: {}", power_tower.call((2, 4))?);
    println!("Second call (should be cached): {}", power_tower.call((2, 4))?);
    println!("Cached results: {}", power_tower.memoizer().len());

    map.clear();
    println!("Map size after clear: {}", map.len());

    Ok(())
}
