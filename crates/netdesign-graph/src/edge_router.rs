use netdesign_core::{Node, Point};
use std::fmt::Write;

pub const DEFAULT_PERIMETER_FACTOR: f64 = 0.8;
pub const DEFAULT_LOOP_RADIUS: f64 = 5.0;

/// Resolved corner points of one orthogonal link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub from_center: Point,
    pub to_center: Point,
    /// Perimeter points on the from and to side.
    pub points: [Point; 2],
    pub bend: Point,
    pub flipped: bool,
}

/// Computes single-bend orthogonal link paths between node icons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRouter {
    pub perimeter_factor: f64,
    /// Radius of the hop drawn over a crossing link.
    pub loop_radius: f64,
}

impl Default for EdgeRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeRouter {
    pub fn new() -> Self {
        Self {
            perimeter_factor: DEFAULT_PERIMETER_FACTOR,
            loop_radius: DEFAULT_LOOP_RADIUS,
        }
    }

    pub fn with_settings(perimeter_factor: f64, loop_radius: f64) -> Self {
        Self {
            perimeter_factor,
            loop_radius,
        }
    }

    /// Point where a link leaving `node` towards `toward` visually starts.
    /// Single-port nodes attach at their center.
    pub fn perimeter_point(&self, node: &Node, toward: Point) -> Point {
        let center = node.center();
        if !node.has_multiple_ports() {
            return center;
        }
        let angle = center.angle_to(toward);
        let rx = node.size.width / 2.0 * self.perimeter_factor;
        let ry = node.size.height / 2.0 * self.perimeter_factor;
        center.offset(rx * angle.cos(), ry * angle.sin())
    }

    /// `(start.x, end.y)`, or `(end.x, start.y)` when flipped.
    pub fn bend_point(start: Point, end: Point, flipped: bool) -> Point {
        if flipped {
            Point::new(end.x, start.y)
        } else {
            Point::new(start.x, end.y)
        }
    }

    pub fn route(&self, from: &Node, to: &Node, flipped: bool) -> EdgeGeometry {
        let from_center = from.center();
        let to_center = to.center();
        let start = self.perimeter_point(from, to_center);
        let end = self.perimeter_point(to, from_center);
        EdgeGeometry {
            from_center,
            to_center,
            points: [start, end],
            bend: Self::bend_point(start, end, flipped),
            flipped,
        }
    }

    /// SVG-style path `M center L perimeter L bend L perimeter L center`.
    /// Hops land on the horizontal leg: before the bend when flipped, after
    /// it otherwise.
    pub fn path(&self, geometry: &EdgeGeometry, crossings: &[Point]) -> String {
        let hops = self.hop_path(geometry.points[0], geometry.points[1], crossings);
        let [start, end] = geometry.points;

        let mut path = String::new();
        push_command(&mut path, 'M', geometry.from_center);
        push_command(&mut path, 'L', start);
        if geometry.flipped {
            path.push_str(&hops);
        }
        push_command(&mut path, 'L', geometry.bend);
        if !geometry.flipped {
            path.push_str(&hops);
        }
        push_command(&mut path, 'L', end);
        push_command(&mut path, 'L', geometry.to_center);
        path
    }

    /// One lateral jog plus semicircle per crossing, ordered along the
    /// direction of travel from `from` to `to`.
    pub fn hop_path(&self, from: Point, to: Point, crossings: &[Point]) -> String {
        let dir = if from.x > to.x { 1.0 } else { -1.0 };
        let mut sorted = crossings.to_vec();
        sorted.sort_by(|a, b| ((b.x - a.x) * dir).total_cmp(&0.0));

        let r = self.loop_radius;
        let sweep = if dir > 0.0 { 0 } else { 1 };
        let mut path = String::new();
        for c in sorted {
            let _ = write!(
                path,
                " L{} {} A{} {} 0 0 {} {} {}",
                c.x + r * dir,
                c.y,
                r,
                r,
                sweep,
                c.x - r * dir,
                c.y
            );
        }
        path
    }
}

fn push_command(path: &mut String, command: char, point: Point) {
    if !path.is_empty() {
        path.push(' ');
    }
    let _ = write!(path, "{command}{} {}", point.x, point.y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdesign_core::{DeviceData, Port, Size, SwitchData};
    use proptest::prelude::*;

    fn switch_at(x: f64, y: f64) -> Node {
        Node::switch("S", "S", SwitchData::default())
            .with_ports(vec![Port::new("p0", "1G"), Port::new("p1", "1G")])
            .with_size(Size::square(60.0))
            .at(Point::new(x, y))
    }

    fn device_at(x: f64, y: f64) -> Node {
        Node::device("D", "D", DeviceData::default())
            .with_size(Size::square(40.0))
            .at(Point::new(x, y))
    }

    #[test]
    fn test_single_port_node_attaches_at_center() {
        let router = EdgeRouter::new();
        let device = device_at(100.0, 100.0);
        assert_eq!(
            router.perimeter_point(&device, Point::new(500.0, 0.0)),
            Point::new(120.0, 120.0)
        );
    }

    #[test]
    fn test_multi_port_node_perimeter() {
        let router = EdgeRouter::new();
        let switch = switch_at(0.0, 0.0);
        let p = router.perimeter_point(&switch, Point::new(1000.0, 30.0));
        assert!((p.x - 54.0).abs() < 1e-9);
        assert!((p.y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_bend_point_follows_flip() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 20.0);
        assert_eq!(EdgeRouter::bend_point(a, b, false), Point::new(0.0, 20.0));
        assert_eq!(EdgeRouter::bend_point(a, b, true), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_path_without_crossings() {
        let router = EdgeRouter::new();
        let geometry = router.route(&device_at(0.0, 0.0), &device_at(280.0, 80.0), false);
        assert_eq!(router.path(&geometry, &[]), "M20 20 L20 20 L20 100 L300 100 L300 100");
    }

    #[test]
    fn test_hops_sorted_along_travel() {
        let router = EdgeRouter::new();
        let left_to_right = router.hop_path(
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
            &[Point::new(70.0, 50.0), Point::new(30.0, 50.0)],
        );
        assert_eq!(
            left_to_right,
            " L25 50 A5 5 0 0 1 35 50 L65 50 A5 5 0 0 1 75 50"
        );

        let right_to_left = router.hop_path(
            Point::new(100.0, 50.0),
            Point::new(0.0, 50.0),
            &[Point::new(30.0, 50.0), Point::new(70.0, 50.0)],
        );
        assert_eq!(
            right_to_left,
            " L75 50 A5 5 0 0 0 65 50 L35 50 A5 5 0 0 0 25 50"
        );
    }

    #[test]
    fn test_hops_placed_on_horizontal_leg() {
        let router = EdgeRouter::new();
        let from = device_at(0.0, 0.0);
        let to = device_at(280.0, 80.0);
        let crossing = [Point::new(150.0, 100.0)];

        let straight = router.path(&router.route(&from, &to, false), &crossing);
        assert!(straight.starts_with("M20 20 L20 20 L20 100 L145 100 A5"));

        let flipped_geometry = router.route(&from, &to, true);
        let flipped = router.path(&flipped_geometry, &[Point::new(150.0, 20.0)]);
        assert!(flipped.starts_with("M20 20 L20 20 L145 20 A5 5 0 0 1 155 20 L300 20"));
    }

    fn node_strategy() -> impl Strategy<Value = Node> {
        (0.0f64..1000.0, 0.0f64..1000.0, any::<bool>()).prop_map(|(x, y, multi)| {
            if multi {
                switch_at(x, y)
            } else {
                device_at(x, y)
            }
        })
    }

    proptest! {
        #[test]
        fn prop_routing_is_deterministic(
            from in node_strategy(),
            to in node_strategy(),
            flipped in any::<bool>(),
            hx in 0.0f64..1000.0,
        ) {
            let router = EdgeRouter::new();
            let first = router.route(&from, &to, flipped);
            let second = router.route(&from, &to, flipped);
            prop_assert_eq!(first, second);
            let crossings = [Point::new(hx, first.bend.y)];
            prop_assert_eq!(router.path(&first, &crossings), router.path(&second, &crossings));
        }

        #[test]
        fn prop_bend_is_orthogonal(
            from in node_strategy(),
            to in node_strategy(),
            flipped in any::<bool>(),
        ) {
            let router = EdgeRouter::new();
            let g = router.route(&from, &to, flipped);
            let [start, end] = g.points;
            prop_assert!(g.bend.x == start.x || g.bend.x == end.x);
            prop_assert!(g.bend.y == start.y || g.bend.y == end.y);
            prop_assert!(g.bend.is_finite());
        }
    }
}
