/// Events emitted during a simulation tick.
/// The scene bridge and the HUD consume these.

use crate::domain::geometry::Cell;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    FoodEaten { cell: Cell },
    CapsuleEaten { cell: Cell },
    AllFoodEaten,
    /// Adversary `index` (spawn number) was eaten and sent home.
    AdversaryCaptured { index: usize },
    /// Fear wore off for adversary `index`.
    AdversaryRecovered { index: usize },
    /// Adversary `index` caught the player.
    PlayerCaught { index: usize },
    QuitRequested,
}
