use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::stream::{self, Stream};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::time::sleep;
use uuid::Uuid;

use crate::application::use_cases::ManageDocumentsUseCase;
use crate::domain::value_objects::DocumentStatus;
use crate::presentation::http::dto::DocumentStatusDto;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct SseHandler {
    documents_use_case: Arc<ManageDocumentsUseCase>,
}

impl SseHandler {
    pub fn new(documents_use_case: Arc<ManageDocumentsUseCase>) -> Self {
        Self { documents_use_case }
    }

    /// Emits a `status` event whenever the document's status changes and
    /// closes after a terminal one.
    pub async fn document_events(
        State(handler): State<Arc<SseHandler>>,
        Path(document_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let use_case = handler.documents_use_case.clone();

        let stream = stream::unfold(Some(None::<DocumentStatus>), move |state| {
            let use_case = use_case.clone();
            async move {
                let mut last_sent = state?;

                loop {
                    match use_case.status(document_id).await {
                        Ok((status, error_message)) => {
                            if last_sent == Some(status) {
                                sleep(POLL_INTERVAL).await;
                                continue;
                            }
                            last_sent = Some(status);

                            let payload = DocumentStatusDto {
                                document_id,
                                status,
                                error_message,
                                is_terminal: status.is_terminal(),
                            };
                            let event = Event::default()
                                .event("status")
                                .data(serde_json::to_string(&payload).unwrap_or_default());

                            let next = if status.is_terminal() {
                                None
                            } else {
                                Some(last_sent)
                            };
                            return Some((Ok::<_, Infallible>(event), next));
                        }
                        Err(e) => {
                            let event = Event::default().event("error").data(e.to_string());
                            return Some((Ok::<_, Infallible>(event), None));
                        }
                    }
                }
            }
        });

        Ok(create_sse_response(stream))
    }
}

pub fn create_sse_response<S>(stream: S) -> Response
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(30))
                .text("keep-alive"),
        )
        .into_response()
}
