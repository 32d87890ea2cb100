#![cfg(feature = "tracing")]
#![forbid(unsafe_code)]

//! Lifecycle reactions emit one `element_reaction` span each, carrying the
//! reaction label, in the same order as the host's reaction log.
//!
//! Run:
//!   cargo test -p tipkit-runtime --features tracing --test reaction_tracing

use std::any::Any;
use std::sync::{Arc, Mutex};

use tipkit_runtime::{CustomElement, ElementDefinition, Host};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

struct Inert;

impl CustomElement for Inert {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct ReactionVisitor {
    reaction: Option<String>,
}

impl tracing::field::Visit for ReactionVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "reaction" {
            self.reaction = Some(value.to_owned());
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "reaction" {
            self.reaction = Some(format!("{value:?}").trim_matches('"').to_owned());
        }
    }
}

struct ReactionCapture {
    labels: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for ReactionCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        if attrs.metadata().name() != "element_reaction" {
            return;
        }
        let mut visitor = ReactionVisitor::default();
        attrs.record(&mut visitor);
        if let Some(label) = visitor.reaction {
            self.labels.lock().expect("label lock").push(label);
        }
    }
}

#[test]
fn reactions_are_traced_in_dispatch_order() {
    let labels = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(ReactionCapture {
        labels: Arc::clone(&labels),
    });

    tracing::subscriber::with_default(subscriber, || {
        let mut host = Host::new();
        host.define(
            "x-inert",
            ElementDefinition::new(|| Box::new(Inert)).observe("data-x"),
        )
        .unwrap();
        let el = host.create_element("x-inert");
        host.set_attribute(el, "data-x", "1").unwrap();
        let root = host.document().root();
        host.append_child(root, el).unwrap();
        host.remove_child(root, el).unwrap();
    });

    let labels = labels.lock().expect("label lock");
    assert_eq!(
        *labels,
        vec![
            "constructed",
            "attribute_changed",
            "connected",
            "disconnected"
        ]
    );
}
