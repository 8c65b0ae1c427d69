use bandwagon::render::RenderOptions;

pub struct DefaultsConfig {
    pub ladder: String,
    pub render: RenderOptions,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            ladder: "100-4k".to_string(),
            render: RenderOptions::default(),
        }
    }
}
