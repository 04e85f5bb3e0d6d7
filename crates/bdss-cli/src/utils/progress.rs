use bdss::core::data::value::Value;
use bdss::engine::events::{Event, EventListener};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Debug, Default)]
struct RunNames {
    parameters: Vec<String>,
    kpis: Vec<String>,
}

/// Turns MCO events into a spinner on stderr and, optionally, one stdout line per
/// optimal point.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: ProgressBar,
    names: Arc<Mutex<RunNames>>,
    print_points: bool,
}

impl CliProgressHandler {
    pub fn new(print_points: bool) -> Self {
        let pb = ProgressBar::new_spinner()
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            pb,
            names: Arc::new(Mutex::new(RunNames::default())),
            print_points,
        }
    }

    pub fn get_listener(&self) -> EventListener<'static> {
        let handler = self.clone();
        Box::new(move |event: &Event| handler.handle(event))
    }

    fn handle(&self, event: &Event) {
        let Ok(mut names) = self.names.lock() else {
            warn!("Progress state mutex was poisoned. Cannot update progress.");
            return;
        };

        match event {
            Event::McoStart {
                parameter_names,
                kpi_names,
            } => {
                names.parameters = parameter_names.clone();
                names.kpis = kpi_names.clone();
                self.pb.reset();
                self.pb.set_style(Self::spinner_style());
                self.pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                self.pb.set_message(format!(
                    "Optimizing {} parameter(s) for {} KPI(s)",
                    parameter_names.len(),
                    kpi_names.len()
                ));
            }
            Event::McoProgress {
                point,
                kpis,
                weights,
            } => {
                self.pb.inc(1);
                if self.print_points {
                    let line = format_point(&names, point, kpis, weights.as_deref());
                    self.pb.suspend(|| println!("{}", line));
                }
            }
            Event::McoFinish => {
                self.pb.disable_steady_tick();
                self.pb
                    .finish_with_message(format!("✓ Done ({} point(s))", self.pb.position()));
            }
            Event::Message(msg) => {
                if self.pb.is_finished() {
                    self.pb.set_message(msg.clone());
                } else {
                    self.pb.println(format!("  {}", msg));
                }
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{pos} found, {elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
    }
}

/// `x=1 y=0.5 | cost=2.25 quality=0.8 | weights=0.5,0.5`. Unnamed columns fall back
/// to their position.
fn format_point(names: &RunNames, point: &[Value], kpis: &[f64], weights: Option<&[f64]>) -> String {
    let label = |names: &[String], i: usize| {
        names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("#{}", i))
    };

    let point_part: Vec<String> = point
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}={}", label(names.parameters.as_slice(), i), v))
        .collect();
    let kpi_part: Vec<String> = kpis
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}={}", label(names.kpis.as_slice(), i), v))
        .collect();

    let mut line = format!("{} | {}", point_part.join(" "), kpi_part.join(" "));
    if let Some(weights) = weights {
        let weights: Vec<String> = weights.iter().map(|w| format!("{:.4}", w)).collect();
        line.push_str(&format!(" | weights={}", weights.join(",")));
    }
    line
}
