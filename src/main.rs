// fixedpool demo binary
// The library lives in lib.rs; this shows a pool of buffers shared by tasks.
// Run with RUST_LOG=trace to see waiter handoffs.

use fixedpool::{ObjectPool, PoolConfiguration};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== fixedpool ===");

    let config = PoolConfiguration::new(2).with_resetter(|buf: &mut Vec<u8>| {
        buf.clear();
        Ok::<_, std::io::Error>(())
    });
    let pool = ObjectPool::with_config(config, || Ok::<_, std::io::Error>(Vec::with_capacity(64)))?;
    let cancel = CancellationToken::new();

    let mut handles = vec![];
    for task in 0..5 {
        let pool = pool.clone();
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            let mut buf = pool.checkout(&cancel).await?;
            buf.extend_from_slice(format!("task {}", task).as_bytes());
            println!("  {} holds a buffer", String::from_utf8_lossy(&buf));
            tokio::time::sleep(Duration::from_millis(20)).await;
            buf.release()
        }));
    }

    for handle in handles {
        handle.await??;
    }

    println!("  Available after all tasks: {}/{}", pool.available_count(), pool.capacity());
    Ok(())
}
