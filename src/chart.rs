//! Chart specifications handed to the browser
//!
//! A [`ChartSpec`](struct.ChartSpec.html) serializes to the figure shape understood by
//! Plotly (`{"data": [...], "layout": {...}}`), so the page only has to pass it on to
//! `Plotly.newPlot`.
use serde::Serialize;

/// Title of the placeholder chart shown when no records could be loaded
pub const NO_DATA_TITLE: &str = "No data available";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layout {
    pub title: Text,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    pub title: Text,
}

/// One series of a chart; bars and boxes are one trace per group so each gets its own color
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar {
        name: String,
        x: Vec<String>,
        y: Vec<u64>,
        text: Vec<String>,
        textposition: &'static str,
    },
    Box {
        name: String,
        x: Vec<String>,
        y: Vec<f64>,
    },
}

impl Trace {
    /// a single labeled bar with its value printed above it
    pub fn bar(label: impl Into<String>, count: u64) -> Self {
        let label = label.into();
        Trace::Bar {
            name: label.clone(),
            x: vec![label],
            y: vec![count],
            text: vec![count.to_string()],
            textposition: "outside",
        }
    }

    pub fn boxed(label: impl Into<String>, values: Vec<f64>) -> Self {
        let label = label.into();
        Trace::Box {
            name: label.clone(),
            x: vec![label; values.len()],
            y: values,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Trace::Bar { name, .. } | Trace::Box { name, .. } => name,
        }
    }
}

fn text(s: impl Into<String>) -> Text {
    Text { text: s.into() }
}

impl ChartSpec {
    /// chart without any traces, carrying only the "No data available" title
    pub fn no_data() -> Self {
        Self {
            data: vec![],
            layout: Layout {
                title: text(NO_DATA_TITLE),
                xaxis: None,
                yaxis: None,
            },
        }
    }

    pub fn new(title: &str, x_title: &str, y_title: &str, data: Vec<Trace>) -> Self {
        Self {
            data,
            layout: Layout {
                title: text(title),
                xaxis: Some(Axis {
                    title: text(x_title),
                }),
                yaxis: Some(Axis {
                    title: text(y_title),
                }),
            },
        }
    }

    pub fn title(&self) -> &str {
        &self.layout.title.text
    }

    pub fn traces(&self) -> &[Trace] {
        &self.data
    }
}
