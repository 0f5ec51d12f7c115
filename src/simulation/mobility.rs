//! Node position storage.

use super::types::{NodeId, Position};

/// Read/write access to node positions.
pub trait MobilityModel {
    fn position(&self, node: NodeId) -> Position;
    fn set_position(&mut self, node: NodeId, position: Position);
}

/// Constant-position mobility: a node stays where it was put until someone
/// moves it explicitly.
#[derive(Debug, Clone, Default)]
pub struct ConstantPositionMobility {
    positions: Vec<Position>,
}

impl ConstantPositionMobility {
    /// Install one position per node, in node-id order.
    pub fn install(positions: impl IntoIterator<Item = Position>) -> Self {
        Self {
            positions: positions.into_iter().collect(),
        }
    }
}

impl MobilityModel for ConstantPositionMobility {
    fn position(&self, node: NodeId) -> Position {
        self.positions[node as usize]
    }

    fn set_position(&mut self, node: NodeId, position: Position) {
        self.positions[node as usize] = position;
    }
}
