//! Display colors handed to the rendering layer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Color {
    #[default]
    White,
    Gray,
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    Orange,
    Brown,
}
