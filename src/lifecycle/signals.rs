//! OS signal handling.
//!
//! SIGINT (Ctrl-C) cancels the running check context; in-flight probes then
//! report `unknown` with a cancellation cause instead of hanging.

use tokio::task::JoinHandle;

use crate::probe::ProbeContext;

/// Cancel `ctx` on the first Ctrl-C. Abort the handle once the work is done.
pub fn cancel_on_ctrl_c(ctx: &ProbeContext) -> JoinHandle<()> {
    let token = ctx.token();
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                match res {
                    Ok(()) => tracing::info!("Interrupt received, cancelling health checks"),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to listen for interrupt");
                        return;
                    }
                }
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}
