//! Background scheduled tasks for the application.
//!
//! The only recurring job is the disposition expiry sweep: claimed slots
//! whose deadline has passed without a disposition are auto-converted to
//! account credit. The sweep is idempotent, so a redundant or missed run
//! is harmless. Call `spawn_all` once during startup.

use crate::services::DispositionService;

/// Spawn all background tasks.
///
/// Notes
/// - The sweep is grouped per player and skips players that fail,
///   so one bad record cannot block unrelated expirations.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(disposition_service: DispositionService, sweep_interval_secs: u64) {
    // 到期未处置奖品自动转积分 (默认每小时)
    {
        let svc = disposition_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.sweep_expired().await {
                    Ok(summary) if summary.swept_slots > 0 => log::info!(
                        "Expiry sweep converted {} slots for {} players ({} cents credited, {} players failed)",
                        summary.swept_slots,
                        summary.players,
                        summary.credited_total_cents,
                        summary.failed_players
                    ),
                    Ok(_) => {}
                    Err(e) => log::error!("Expiry sweep failed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(sweep_interval_secs)).await;
            }
        });
    }
}
