use crate::graph::TopologyGraph;
use netdesign_core::{Node, Point};

/// Row-major grid placement for snapshots that carry no positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub offset_x: f64,
    pub offset_y: f64,
    pub items_per_row: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            offset_x: 150.0,
            offset_y: 150.0,
            items_per_row: 8,
        }
    }
}

impl GridLayout {
    /// Rows and columns both start at 1, so the first node sits at
    /// `(offset_x, offset_y)`.
    pub fn position(&self, index: usize) -> Point {
        let per_row = self.items_per_row.max(1);
        let row = index / per_row + 1;
        let column = index % per_row + 1;
        Point::new(self.offset_x * column as f64, self.offset_y * row as f64)
    }

    pub fn apply<'a>(&self, nodes: impl IntoIterator<Item = &'a mut Node>) {
        for (index, node) in nodes.into_iter().enumerate() {
            node.position = self.position(index);
        }
    }
}

impl TopologyGraph {
    pub fn apply_layout(&mut self, layout: &GridLayout) {
        layout.apply(self.nodes_mut().iter_mut().filter(|n| n.is_concrete()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdesign_core::DeviceData;

    #[test]
    fn test_grid_wraps_rows() {
        let layout = GridLayout::default();
        assert_eq!(layout.position(0), Point::new(150.0, 150.0));
        assert_eq!(layout.position(7), Point::new(1200.0, 150.0));
        assert_eq!(layout.position(8), Point::new(150.0, 300.0));
    }

    #[test]
    fn test_apply_sets_positions() {
        let mut nodes: Vec<Node> = (0..3)
            .map(|i| Node::device(format!("D{i}"), "", DeviceData::default()))
            .collect();
        GridLayout {
            offset_x: 10.0,
            offset_y: 20.0,
            items_per_row: 2,
        }
        .apply(nodes.iter_mut());
        assert_eq!(nodes[1].position, Point::new(20.0, 20.0));
        assert_eq!(nodes[2].position, Point::new(10.0, 40.0));
    }
}
