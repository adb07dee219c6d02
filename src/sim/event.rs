/// Events emitted during a gameplay step.
/// The presentation layer consumes these for the status line.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { from: (i32, i32), to: (i32, i32) },
    BoxPushed { from: (i32, i32), to: (i32, i32) },
    MoveBlocked,
    ObstacleHit { time_effect: i32, message: String },
    GoalFilled { x: i32, y: i32 },
    LevelCleared,
}
