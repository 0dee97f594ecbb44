use crate::edge_router::{EdgeGeometry, EdgeRouter};
use crate::graph::TopologyGraph;
use netdesign_core::{EdgeId, NodeId, Point, generate_id, is_between};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_ID_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// Crossing of one link's horizontal leg by another link's vertical leg,
/// recorded against the horizontal one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub id: String,
    pub edge: EdgeId,
    pub intersection: Point,
}

/// Splits a routed link into its horizontal and vertical legs. Each leg runs
/// from the bend to a perimeter point; a leg is vertical when it shares the
/// bend's x. Only the first leg of each orientation is kept.
pub fn segments(geometry: &EdgeGeometry) -> (Option<Segment>, Option<Segment>) {
    let bend = geometry.bend;
    let mut horizontal = None;
    let mut vertical = None;
    for point in geometry.points {
        let leg = Segment::new(bend, point);
        if bend.x == point.x {
            vertical.get_or_insert(leg);
        } else {
            horizontal.get_or_insert(leg);
        }
    }
    (horizontal, vertical)
}

/// Strict crossing test. Touching at an endpoint does not count.
pub fn intersection(horizontal: Segment, vertical: Segment) -> Option<Point> {
    let x = vertical.start.x;
    let y = horizontal.start.y;
    (is_between(x, horizontal.start.x, horizontal.end.x)
        && is_between(y, vertical.start.y, vertical.end.y))
    .then(|| Point::new(x, y))
}

/// Full pairwise scan of every horizontal leg against every vertical leg.
pub fn detect(routes: &[(EdgeId, EdgeGeometry)], id_length: usize) -> Vec<Collision> {
    let legs: Vec<_> = routes
        .iter()
        .map(|(id, geometry)| (id, segments(geometry)))
        .collect();

    let mut collisions = Vec::new();
    for (h_id, (h, _)) in &legs {
        let Some(h) = h else { continue };
        for (_, (_, v)) in &legs {
            let Some(v) = v else { continue };
            if let Some(point) = intersection(*h, *v) {
                collisions.push(Collision {
                    id: generate_id(id_length),
                    edge: (*h_id).clone(),
                    intersection: point,
                });
            }
        }
    }
    collisions
}

/// Cached geometry and collisions for the whole link set.
#[derive(Debug, Clone)]
pub struct RoutingEngine {
    router: EdgeRouter,
    id_length: usize,
    collisions: Vec<Collision>,
    paths: HashMap<EdgeId, String>,
}

impl Default for RoutingEngine {
    fn default() -> Self {
        Self::new(EdgeRouter::default())
    }
}

impl RoutingEngine {
    pub fn new(router: EdgeRouter) -> Self {
        Self {
            router,
            id_length: DEFAULT_ID_LENGTH,
            collisions: Vec::new(),
            paths: HashMap::new(),
        }
    }

    pub fn with_id_length(mut self, id_length: usize) -> Self {
        self.id_length = id_length;
        self
    }

    pub fn router(&self) -> &EdgeRouter {
        &self.router
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn path(&self, edge: &EdgeId) -> Option<&str> {
        self.paths.get(edge).map(String::as_str)
    }

    pub fn routes(&self, graph: &TopologyGraph) -> Vec<(EdgeId, EdgeGeometry)> {
        graph
            .edges()
            .iter()
            .filter_map(|edge| {
                let from = graph.node(&edge.from)?;
                let to = graph.node(&edge.to)?;
                Some((edge.id.clone(), self.router.route(from, to, edge.flipped)))
            })
            .collect()
    }

    /// Recomputes collisions and every path. Links whose ends do not resolve
    /// get no path.
    pub fn recompute(&mut self, graph: &TopologyGraph) {
        let routes = self.routes(graph);
        self.collisions = detect(&routes, self.id_length);

        let mut crossings: HashMap<&EdgeId, Vec<Point>> = HashMap::new();
        for collision in &self.collisions {
            crossings
                .entry(&collision.edge)
                .or_default()
                .push(collision.intersection);
        }

        let mut paths = HashMap::with_capacity(routes.len());
        for (id, geometry) in &routes {
            let hops = crossings.get(id).map(Vec::as_slice).unwrap_or_default();
            paths.insert(id.clone(), self.router.path(geometry, hops));
        }
        self.paths = paths;
        tracing::debug!(
            links = routes.len(),
            collisions = self.collisions.len(),
            "routing recomputed"
        );
    }

    /// Cheap update while dragging: plain paths, without hops, for the links
    /// touching `node`. The next `recompute` restores the crossings.
    pub fn refresh_touching(&mut self, graph: &TopologyGraph, node: &NodeId) {
        for edge in graph.links_of(node) {
            let (Some(from), Some(to)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
                continue;
            };
            let geometry = self.router.route(from, to, edge.flipped);
            self.paths
                .insert(edge.id.clone(), self.router.path(&geometry, &[]));
        }
    }

    pub fn clear(&mut self) {
        self.collisions.clear();
        self.paths.clear();
    }
}
