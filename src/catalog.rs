//! Built-in diagrams shown on the demo page.

use crate::components::diagram::{DiagramDescriptor, LayoutParams, LinkSpec, NodeSpec, RenderHints, SurfaceHeight};

fn node(id: &str, label: &str, category: &str) -> NodeSpec {
	NodeSpec {
		id: id.into(),
		label: label.into(),
		sublabel: None,
		category: category.into(),
		layer: None,
		column: None,
		radius: None,
	}
}

fn layered(id: &str, label: &str, category: &str, layer: usize, column: f64) -> NodeSpec {
	NodeSpec {
		layer: Some(layer),
		column: Some(column),
		..node(id, label, category)
	}
}

fn link(source: &str, target: &str) -> LinkSpec {
	LinkSpec {
		source: source.into(),
		target: target.into(),
		..Default::default()
	}
}

fn step(source: &str, target: &str, sequence: u32, label: &str) -> LinkSpec {
	LinkSpec {
		sequence: Some(sequence),
		label: Some(label.into()),
		..link(source, target)
	}
}

/// A request travelling down through the tiers and back.
pub fn request_lifecycle() -> DiagramDescriptor {
	let mut nodes = vec![
		layered("browser", "Browser", "client", 0, 0.5),
		layered("edge", "Edge", "gateway", 1, 0.3),
		layered("auth", "Auth", "service", 1, 0.7),
		layered("api", "API", "service", 2, 0.5),
		layered("cache", "Cache", "storage", 3, 0.3),
		layered("db", "Postgres", "storage", 3, 0.7),
	];
	nodes[3].sublabel = Some("axum".into());

	DiagramDescriptor {
		id: "diagram-request-lifecycle".into(),
		title: Some("Request lifecycle".into()),
		nodes,
		links: vec![
			step("browser", "edge", 1, "HTTPS"),
			step("edge", "auth", 2, "verify"),
			step("edge", "api", 3, "route"),
			step("api", "cache", 4, "lookup"),
			step("api", "db", 5, "query"),
			LinkSpec {
				dashed: true,
				label: Some("response".into()),
				..link("api", "browser")
			},
		],
		layers: vec!["client".into(), "edge".into(), "application".into(), "data".into()],
		layout: LayoutParams::default(),
		hints: RenderHints {
			height: SurfaceHeight::Fixed(480.0),
			..Default::default()
		},
	}
}

/// Producers, a queue and a worker pool with a retry path.
pub fn event_pipeline() -> DiagramDescriptor {
	let mut workers: Vec<NodeSpec> = (1..=3)
		.map(|i| node(&format!("worker-{i}"), &format!("Worker {i}"), "worker"))
		.collect();
	for w in &mut workers {
		w.radius = Some(18.0);
	}

	let mut nodes = vec![
		node("ingest", "Ingest", "gateway"),
		node("queue", "Queue", "queue"),
		node("dlq", "Dead letters", "queue"),
		node("sink", "Warehouse", "storage"),
	];
	nodes[1].sublabel = Some("at-least-once".into());
	nodes.extend(workers);

	let mut links = vec![link("ingest", "queue")];
	for i in 1..=3 {
		let w = format!("worker-{i}");
		links.push(link("queue", &w));
		links.push(link(&w, "sink"));
	}
	links.push(LinkSpec {
		dashed: true,
		label: Some("retry".into()),
		..link("worker-2", "queue")
	});
	links.push(LinkSpec {
		dashed: true,
		..link("queue", "dlq")
	});

	DiagramDescriptor {
		id: "diagram-event-pipeline".into(),
		title: Some("Event pipeline".into()),
		nodes,
		links,
		layers: Vec::new(),
		layout: LayoutParams {
			link_distance: Some(95.0),
			..Default::default()
		},
		hints: RenderHints::default(),
	}
}

/// Services talking through sidecars, with a long-range call and a
/// self-referential health check.
pub fn service_mesh() -> DiagramDescriptor {
	let services = ["orders", "billing", "inventory", "shipping"];
	let mut nodes = vec![node("ingress", "Ingress", "gateway")];
	nodes.extend(services.iter().map(|s| node(s, &capitalize(s), "service")));
	nodes.push(node("payments", "Payments API", "external"));

	let mut links: Vec<LinkSpec> = services.iter().map(|s| link("ingress", s)).collect();
	links.push(link("orders", "inventory"));
	links.push(link("orders", "billing"));
	links.push(link("inventory", "shipping"));
	links.push(LinkSpec {
		curved: true,
		label: Some("charge".into()),
		..link("billing", "payments")
	});
	links.push(LinkSpec {
		curved: true,
		label: Some("audit".into()),
		..link("shipping", "orders")
	});
	links.push(LinkSpec {
		curved: true,
		dashed: true,
		label: Some("health".into()),
		..link("ingress", "ingress")
	});

	DiagramDescriptor {
		id: "diagram-service-mesh".into(),
		title: Some("Service mesh".into()),
		nodes,
		links,
		layers: Vec::new(),
		layout: LayoutParams {
			repulsion: Some(-420.0),
			..Default::default()
		},
		hints: RenderHints {
			height: SurfaceHeight::Viewport(0.6),
			animate_dashed: true,
			..Default::default()
		},
	}
}

fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Every built-in diagram, in page order.
pub fn builtin() -> Vec<DiagramDescriptor> {
	vec![request_lifecycle(), event_pipeline(), service_mesh()]
}
