/*!
    Frame source configuration types.
*/

use framepipe_types::TargetGeometry;

/**
    Configuration for opening a [`FrameSource`](crate::FrameSource).
*/
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Force a specific demuxer instead of probing the input
    /// (e.g. `"image2"` for numbered image sequences).
    pub format_hint: Option<String>,
    /// Geometry every produced frame is scaled and converted to.
    pub geometry: TargetGeometry,
}

impl SourceConfig {
    /**
        Create a config that probes the container format.
    */
    pub fn new(geometry: TargetGeometry) -> Self {
        Self {
            format_hint: None,
            geometry,
        }
    }

    /**
        Force a specific demuxer by name.

        The name must resolve to a known input format at open time;
        `"image2"` turns a printf-style path pattern (`frames/%03d.png`)
        into a pseudo-video source.
    */
    pub fn with_format_hint(mut self, hint: impl Into<String>) -> Self {
        self.format_hint = Some(hint.into());
        self
    }
}
