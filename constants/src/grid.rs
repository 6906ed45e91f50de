/// Edge length of the square ground grid.
pub const GRID_SIZE: f32 = 20.0;

/// Number of cells along each grid edge.
pub const GRID_DIVISIONS: u32 = 20;

/// Centre line colour (0x333333).
pub const GRID_CENTRE_RGB: [u8; 3] = [0x33, 0x33, 0x33];

/// Regular line colour (0x222222).
pub const GRID_LINE_RGB: [u8; 3] = [0x22, 0x22, 0x22];

/// Length of each axis marker line.
pub const AXIS_LENGTH: f32 = 5.0;
