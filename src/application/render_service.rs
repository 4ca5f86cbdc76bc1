// Render service - fetches widget data and renders the dashboard, in one shot or progressively
use crate::application::session::DashboardSession;
use crate::application::widget_data_service::WidgetDataService;
use crate::application::widget_renderer::render;
use crate::domain::dashboard::{Dashboard, RenderedWidget};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderFrame {
    /// Every widget as a placeholder, sent before any data is fetched
    Skeleton { dashboard: Dashboard },
    /// One widget whose fetch landed
    Update { rendered: RenderedWidget },
    #[serde(rename_all = "camelCase")]
    Complete { total_widgets: usize, duration_ms: u64 },
}

#[derive(Clone)]
pub struct RenderService {
    data: WidgetDataService,
}

impl RenderService {
    pub fn new(data: WidgetDataService) -> Self {
        Self { data }
    }

    /// Fetches every widget concurrently and renders once all have settled.
    pub async fn render_dashboard(
        &self,
        session: &Arc<Mutex<DashboardSession>>,
    ) -> Dashboard {
        let (params, tickets) = session.lock().await.begin_fetches(&self.data, Utc::now());

        let results = futures::future::join_all(tickets.iter().map(|(widget, ticket)| {
            let params = &params;
            async move { (ticket, self.data.fetch(widget, params).await) }
        }))
        .await;

        let mut s = session.lock().await;
        for (ticket, result) in results {
            s.fetches.resolve(ticket, result);
        }
        s.snapshot(Utc::now())
    }

    /// Sends a skeleton frame, then one frame per widget as its data lands,
    /// then a completion frame.
    pub async fn stream_dashboard(
        &self,
        session: Arc<Mutex<DashboardSession>>,
    ) -> mpsc::Receiver<RenderFrame> {
        let (tx, rx) = mpsc::channel(100);
        let start_time = Instant::now();

        let (params, tickets, skeleton) = {
            let mut s = session.lock().await;
            let now = Utc::now();
            let (params, tickets) = s.begin_fetches(&self.data, now);
            (params, tickets, s.snapshot(now))
        };

        let total_widgets = tickets.len();
        let _ = tx.send(RenderFrame::Skeleton { dashboard: skeleton }).await;

        let mut tasks = JoinSet::new();
        for (widget, ticket) in tickets {
            let tx = tx.clone();
            let data = self.data.clone();
            let session = session.clone();
            let params = params.clone();

            tasks.spawn(async move {
                let result = data.fetch(&widget, &params).await;

                let rendered = {
                    let mut s = session.lock().await;
                    if !s.fetches.resolve(&ticket, result) {
                        return;
                    }
                    render(&widget, &s.fetches.state(&widget.id))
                };
                let _ = tx.send(RenderFrame::Update { rendered }).await;
            });
        }

        tokio::spawn(async move {
            while tasks.join_next().await.is_some() {}

            let duration_ms = start_time.elapsed().as_millis() as u64;
            tracing::debug!("Rendered {} widgets in {} ms", total_widgets, duration_ms);
            let _ = tx
                .send(RenderFrame::Complete {
                    total_widgets,
                    duration_ms,
                })
                .await;
        });

        rx
    }
}
