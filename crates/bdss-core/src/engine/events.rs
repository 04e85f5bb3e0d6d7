use crate::core::data::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    McoStart {
        parameter_names: Vec<String>,
        kpi_names: Vec<String>,
    },
    /// A point proposed by the optimizer together with its KPI values. `weights` is
    /// set when the point is the optimum of a weighted sub-problem.
    McoProgress {
        point: Vec<Value>,
        kpis: Vec<f64>,
        weights: Option<Vec<f64>>,
    },
    McoFinish,

    Message(String),
}

pub type EventListener<'a> = Box<dyn Fn(&Event) + Send + Sync + 'a>;

/// Delivers events to every registered listener, synchronously and in registration
/// order.
#[derive(Default)]
pub struct EventReporter<'a> {
    listeners: Vec<EventListener<'a>>,
}

impl<'a> EventReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: EventListener<'a>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn add_listener(&mut self, listener: EventListener<'a>) {
        self.listeners.push(listener);
    }

    #[inline]
    pub fn report(&self, event: Event) {
        for listener in &self.listeners {
            listener(&event);
        }
    }
}
