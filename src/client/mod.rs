// src/client/mod.rs
//! Consumer side of the details endpoint: one fetch per page load, a
//! cosmetic loading indicator while it is pending, and the view model that
//! decides which cards render.

pub mod api;
pub mod disclaimer;
pub mod progress;
pub mod view;

pub use api::{ClientError, DashboardClient};
pub use disclaimer::DisclaimerCycle;
pub use progress::{LoadingProgress, LOADING_STEPS};
pub use view::{Card, CardKind, DashboardView};

/// Fetches `symbol` while reporting loading steps through `on_step`.
///
/// Dropping the returned future cancels both the request and the step timer.
pub async fn load_dashboard<F>(client: &DashboardClient, symbol: &str, mut on_step: F) -> DashboardView
where
    F: FnMut(usize, &'static str),
{
    let progress = LoadingProgress::start();
    let mut steps = progress.subscribe();
    on_step(0, LOADING_STEPS[0]);

    let fetch = client.fetch_details(symbol);
    tokio::pin!(fetch);

    let result = loop {
        tokio::select! {
            result = &mut fetch => break result,
            changed = steps.changed() => {
                if changed.is_err() {
                    // Indicator parked on its last step.
                    break (&mut fetch).await;
                }
                let step = *steps.borrow_and_update();
                on_step(step, LOADING_STEPS[step]);
            }
        }
    };

    drop(progress);
    DashboardView::from_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accepts one connection and never answers. `seen` fires once the
    /// request head arrives, `closed` once the peer hangs up.
    async fn silent_server() -> (String, oneshot::Receiver<()>, oneshot::Receiver<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, seen) = oneshot::channel();
        let (closed_tx, closed) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut seen_tx = Some(seen_tx);
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        received.extend_from_slice(&buf[..n]);
                        if received.windows(4).any(|w| w == b"\r\n\r\n") {
                            if let Some(tx) = seen_tx.take() {
                                let _ = tx.send(());
                            }
                        }
                    }
                }
            }
            let _ = closed_tx.send(());
        });

        (format!("http://{}", addr), seen, closed)
    }

    #[tokio::test]
    async fn dropping_the_load_cancels_request_and_steps() {
        let (base, seen, closed) = silent_server().await;
        let client = DashboardClient::new(base, Duration::from_secs(60)).unwrap();
        let steps = Arc::new(Mutex::new(Vec::new()));
        let recorder = steps.clone();

        let mut load = Box::pin(load_dashboard(&client, "TCS", move |step, _| {
            recorder.lock().unwrap().push(step)
        }));
        tokio::select! {
            _ = &mut load => panic!("load finished without a response"),
            _ = seen => {}
        }

        // Request is in flight; let the indicator run to 8s, then give up.
        tokio::time::pause();
        let outcome = tokio::time::timeout(Duration::from_secs(10), &mut load).await;
        assert!(outcome.is_err());
        drop(load);
        assert_eq!(*steps.lock().unwrap(), vec![0, 1, 2]);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(steps.lock().unwrap().len(), 3);

        tokio::time::resume();
        drop(client);
        tokio::time::timeout(Duration::from_secs(5), closed)
            .await
            .expect("connection still open after drop")
            .unwrap();
    }
}
