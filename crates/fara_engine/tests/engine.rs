use std::sync::Arc;
use std::time::Duration;

use fara_engine::{
    EngineEvent, EngineHandle, FailureKind, FetchError, FetchMetadata, FetchOutput, PageFetcher,
    PageRequest,
};
use pretty_assertions::assert_eq;

/// Serves canned bodies; POSTs echo their first form value, unknown URLs fail.
struct CannedFetcher {
    delay: Duration,
}

#[async_trait::async_trait]
impl PageFetcher for CannedFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchOutput, FetchError> {
        tokio::time::sleep(self.delay).await;
        let (bytes, content_type): (Vec<u8>, &str) = match request {
            PageRequest::Get { url } if url.ends_with("/latin1") => {
                (b"Bogot\xe1".to_vec(), "text/html; charset=iso-8859-1")
            }
            PageRequest::Get { url } if url.ends_with("/ok") => {
                (b"<p>ok</p>".to_vec(), "text/html")
            }
            PageRequest::PostForm { form, .. } => {
                (form[0].1.clone().into_bytes(), "text/html")
            }
            PageRequest::Get { url } => {
                return Err(FetchError {
                    kind: FailureKind::HttpStatus(404),
                    message: format!("no page at {url}"),
                })
            }
        };
        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: request.url().to_string(),
                final_url: request.url().to_string(),
                content_type: Some(content_type.to_string()),
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

fn engine(delay: Duration) -> EngineHandle {
    EngineHandle::with_fetcher(Arc::new(CannedFetcher { delay }), 2).expect("engine starts")
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine
        .recv_timeout(Duration::from_secs(5))
        .expect("engine reported in time")
}

#[test]
fn completed_fetch_is_decoded() {
    let engine = engine(Duration::ZERO);
    engine.fetch(
        4,
        PageRequest::Get {
            url: "https://efile.fara.gov/latin1".to_string(),
        },
    );

    let EngineEvent::FetchCompleted { job_id, result } = next_event(&engine);
    assert_eq!(job_id, 4);
    let page = result.expect("decoded");
    assert_eq!(page.body, "Bogotá");
    assert_eq!(page.encoding_label, "windows-1252");
}

#[test]
fn every_request_reports_once() {
    let engine = engine(Duration::from_millis(10));
    engine.fetch(
        1,
        PageRequest::Get {
            url: "https://efile.fara.gov/ok".to_string(),
        },
    );
    engine.fetch(
        2,
        PageRequest::PostForm {
            url: "https://efile.fara.gov/pls/apex/wwv_flow.show".to_string(),
            form: vec![("p_request".to_string(), "APXWGT".to_string())],
        },
    );
    engine.fetch(
        3,
        PageRequest::Get {
            url: "https://efile.fara.gov/gone".to_string(),
        },
    );

    let mut outcomes: Vec<_> = (0..3)
        .map(|_| match next_event(&engine) {
            EngineEvent::FetchCompleted { job_id, result } => {
                (job_id, result.map(|page| page.body).map_err(|err| err.kind))
            }
        })
        .collect();
    outcomes.sort_by_key(|(job_id, _)| *job_id);

    assert_eq!(
        outcomes,
        vec![
            (1, Ok("<p>ok</p>".to_string())),
            (2, Ok("APXWGT".to_string())),
            (3, Err(FailureKind::HttpStatus(404))),
        ]
    );
    assert!(engine.try_recv().is_none());
}

#[test]
fn stop_cancels_outstanding_fetches() {
    let engine = engine(Duration::from_secs(30));
    engine.fetch(
        9,
        PageRequest::Get {
            url: "https://efile.fara.gov/ok".to_string(),
        },
    );
    engine.stop();

    let EngineEvent::FetchCompleted { job_id, result } = next_event(&engine);
    assert_eq!(job_id, 9);
    assert_eq!(result.unwrap_err().kind, FailureKind::Cancelled);
}
