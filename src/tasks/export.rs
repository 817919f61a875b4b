//! Runs exports off the interactive path.
//!
//! Each request is rasterized on the blocking pool and answered with an
//! [`ExportFinished`] carrying the same id. Cancelling drops in-flight renders;
//! their results are never delivered.

use std::collections::VecDeque;

use anyhow::Result;
use image::RgbaImage;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CompositionError;
use crate::events::{ExportFinished, ExportRequest};
use crate::render::export::RenderOptions;

pub async fn run(
    mut requests: Receiver<ExportRequest>,
    finished: Sender<ExportFinished>,
    options: RenderOptions,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let max_in_flight = max_in_flight.max(1);
    let mut tasks: JoinSet<ExportFinished> = JoinSet::new();
    let mut queued: VecDeque<ExportRequest> = VecDeque::new();
    let mut requests_open = true;

    loop {
        if !requests_open && queued.is_empty() && tasks.is_empty() {
            debug!("export requests closed; stopping");
            break;
        }
        while tasks.len() < max_in_flight {
            let Some(request) = queued.pop_front() else {
                break;
            };
            spawn_export(&mut tasks, request, options);
        }

        select! {
            _ = cancel.cancelled() => {
                debug!(in_flight = tasks.len(), queued = queued.len(), "export task cancelled");
                tasks.abort_all();
                break;
            },

            maybe = requests.recv(), if requests_open => {
                match maybe {
                    Some(request) => queued.push_back(request),
                    None => requests_open = false,
                }
            }

            Some(join_res) = tasks.join_next() => {
                match join_res {
                    Ok(done) => {
                        match &done.result {
                            Ok(img) => info!(id = done.id, width = img.width(), height = img.height(), "export finished"),
                            Err(err) => warn!(id = done.id, error = %err, "export failed"),
                        }
                        if finished.send(done).await.is_err() {
                            debug!("export receiver dropped; stopping");
                            tasks.abort_all();
                            break;
                        }
                    }
                    Err(err) => warn!("export worker panicked or was aborted: {err}"),
                }
            }
        }
    }
    Ok(())
}

fn spawn_export(tasks: &mut JoinSet<ExportFinished>, request: ExportRequest, options: RenderOptions) {
    let ExportRequest {
        id,
        composition,
        scale,
    } = request;
    debug!(id, template = %composition.template, scale, "export started");
    tasks.spawn(async move {
        let res = tokio::task::spawn_blocking(move || composition.export(scale, &options)).await;
        ExportFinished {
            id,
            result: worker_result(res),
        }
    });
}

/// A panicked or aborted render still answers its request, as a failure.
fn worker_result(
    res: Result<Result<RgbaImage, CompositionError>, JoinError>,
) -> Result<RgbaImage, CompositionError> {
    res.unwrap_or_else(|err| {
        warn!("export render worker failed: {err}");
        Err(CompositionError::RenderFailed(err.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::composition::Composition;
    use crate::template::Template;

    fn small_options() -> RenderOptions {
        RenderOptions {
            base_width: 32,
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn answers_every_request_by_id() {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (done_tx, mut done_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(req_rx, done_tx, small_options(), cancel.clone(), 1));

        let img = Arc::new(RgbaImage::from_pixel(8, 4, image::Rgba([1, 1, 1, 255])));
        for id in 0..3 {
            req_tx
                .send(ExportRequest {
                    id,
                    composition: Composition::new(Arc::clone(&img), Template::InstagramPostSquare),
                    scale: 1.0,
                })
                .await
                .unwrap();
        }
        let mut ids = Vec::new();
        for _ in 0..3 {
            let done = tokio::time::timeout(Duration::from_secs(5), done_rx.recv())
                .await
                .expect("timeout waiting for export")
                .expect("channel closed");
            assert_eq!(done.result.unwrap().dimensions(), (32, 32));
            ids.push(done.id);
        }
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2]);

        drop(req_tx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("export task still running after requests closed")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn stops_when_requests_close_while_idle() {
        let (req_tx, req_rx) = mpsc::channel::<ExportRequest>(1);
        let (done_tx, mut done_rx) = mpsc::channel(1);
        let handle = tokio::spawn(run(req_rx, done_tx, small_options(), CancellationToken::new(), 1));
        drop(req_tx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("export task still running after requests closed")
            .unwrap()
            .unwrap();
        assert!(done_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn panicked_render_is_reported_as_render_failure() {
        let res = tokio::task::spawn_blocking(|| -> Result<RgbaImage, CompositionError> {
            panic!("resampler blew up")
        })
        .await;
        let err = worker_result(res).unwrap_err();
        assert!(
            matches!(err, CompositionError::RenderFailed(ref reason) if reason.contains("panic")),
            "{err}"
        );
    }

    #[tokio::test]
    async fn failures_are_delivered_not_swallowed() {
        let (req_tx, req_rx) = mpsc::channel(1);
        let (done_tx, mut done_rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(req_rx, done_tx, small_options(), cancel.clone(), 2));

        req_tx
            .send(ExportRequest {
                id: 7,
                composition: Composition::new(Arc::new(RgbaImage::new(0, 5)), Template::InstagramStory),
                scale: 1.0,
            })
            .await
            .unwrap();
        let done = done_rx.recv().await.unwrap();
        assert_eq!(done.id, 7);
        assert!(matches!(
            done.result,
            Err(CompositionError::InvalidImageDimensions { .. })
        ));

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn stops_on_cancel() {
        let (_req_tx, req_rx) = mpsc::channel::<ExportRequest>(1);
        let (done_tx, _done_rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(req_rx, done_tx, small_options(), cancel.clone(), 1));
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("export task did not stop")
            .unwrap()
            .unwrap();
    }
}
