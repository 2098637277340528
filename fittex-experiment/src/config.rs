/// Session configuration parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Copies of each base combination in the pool
    pub replicates: usize,
    /// File name of the exported log, placed on the user's desktop
    pub output_file_name: String,
    pub miss_tone_hz: u32,
    pub miss_tone_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            replicates: 10,
            output_file_name: "Raw_Data.csv".to_string(),
            miss_tone_hz: 750,
            miss_tone_ms: 300,
        }
    }
}
