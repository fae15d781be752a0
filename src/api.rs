use chrono::NaiveDate;
use post_kpi::freshness::post_window_state;
use post_kpi::{
    classify, due_alert, DueAlert, PerformanceResult, Post, StandardsTable, Window, WindowState,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiWindowView {
    pub window: Window,
    pub reach: f64,
    pub engagement: f64,
    pub rate: String,
    pub state: WindowState,
    pub result: PerformanceResult,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiPostView {
    pub post: Post,
    pub metrics_disabled: bool,
    pub windows: Vec<ApiWindowView>,
    pub alert: Option<DueAlert>,
}

impl ApiPostView {
    /// Evaluated against the standards and date given; nothing is cached between calls.
    pub fn build(post: Post, standards: &StandardsTable, today: NaiveDate) -> Self {
        let disabled = post.metrics_disabled();
        let windows = Window::ALL
            .into_iter()
            .map(|window| {
                let aggregate = post.metrics(window).aggregate();
                let result = classify(&post, window, standards);
                ApiWindowView {
                    window,
                    reach: aggregate.reach,
                    engagement: aggregate.engagement,
                    rate: if disabled {
                        "-".to_string()
                    } else {
                        aggregate.rate_display()
                    },
                    state: post_window_state(&post, window, today),
                    color: result.color(),
                    result,
                }
            })
            .collect();
        let alert = due_alert(&post, today);

        Self {
            metrics_disabled: disabled,
            windows,
            alert,
            post,
        }
    }

    pub fn window(&self, window: Window) -> Option<&ApiWindowView> {
        self.windows.iter().find(|view| view.window == window)
    }
}
