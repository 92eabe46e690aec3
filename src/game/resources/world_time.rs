/// Monotonic tick counter advanced by the game loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorldTime {
    pub ticks: u64,
}

impl WorldTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
    }
}
