/*!
    Declarative filter stage planning.
*/

use std::fmt::Write as _;

use framepipe_types::{PixelFormat, ResolvedGeometry};

/**
    Geometry and pixel format of the frames entering a filter graph.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameFormat {
    /**
        Create a new frame format.
    */
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }
}

/**
    One stage of a filter chain.

    Stages always apply in the fixed order scale → pad → format: padding
    assumes pre-scaled content, and color conversion happens after all
    geometric work so chroma is resampled exactly once.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterStage {
    /// Resample to the given dimensions.
    Scale { width: u32, height: u32 },
    /// Pad to the given dimensions, placing the input at (x, y) on black.
    Pad { width: u32, height: u32, x: u32, y: u32 },
    /// Convert to the given pixel format.
    Format(PixelFormat),
}

/**
    Plan the filter stages needed to turn `src` frames into `target` frames.

    - Dimensions differ and `keep_aspect_ratio` holds with an aspect-ratio
      mismatch over 1%: scale-to-fit plus centered black padding.
    - Dimensions differ otherwise: a plain (possibly distorting) scale.
    - Pixel format differs: a trailing format conversion.

    An empty plan means the source already matches the target.
*/
pub fn plan_stages(
    src: FrameFormat,
    target: &ResolvedGeometry,
    keep_aspect_ratio: bool,
) -> Vec<FilterStage> {
    let mut stages = Vec::new();

    if target.width != src.width || target.height != src.height {
        match keep_aspect_ratio
            .then(|| target.letterbox(src.width, src.height))
            .flatten()
        {
            Some(lb) => {
                stages.push(FilterStage::Scale {
                    width: lb.width,
                    height: lb.height,
                });
                stages.push(FilterStage::Pad {
                    width: target.width,
                    height: target.height,
                    x: lb.x,
                    y: lb.y,
                });
            }
            None => {
                stages.push(FilterStage::Scale {
                    width: target.width,
                    height: target.height,
                });
            }
        }
    }

    if target.format != src.format {
        stages.push(FilterStage::Format(target.format));
    }

    stages
}

/**
    Render a stage plan as an FFmpeg filter-graph description string.

    An empty plan renders the `null` filter, which passes frames through
    unchanged (the graph parser rejects an empty description).
*/
pub fn render_spec(stages: &[FilterStage]) -> String {
    if stages.is_empty() {
        return "null".to_owned();
    }

    let mut spec = String::new();
    for stage in stages {
        if !spec.is_empty() {
            spec.push(',');
        }
        match *stage {
            FilterStage::Scale { width, height } => {
                let _ = write!(spec, "scale=w={width}:h={height}");
            }
            FilterStage::Pad {
                width,
                height,
                x,
                y,
            } => {
                let _ = write!(spec, "pad={width}:{height}:{x}:{y}:black");
            }
            FilterStage::Format(format) => {
                let _ = write!(spec, "format={}", format.ffmpeg_name());
            }
        }
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use framepipe_types::TargetGeometry;

    fn resolved(width: u32, height: u32, format: PixelFormat) -> ResolvedGeometry {
        ResolvedGeometry {
            width,
            height,
            format,
        }
    }

    #[test]
    fn matching_source_plans_nothing() {
        let src = FrameFormat::new(640, 480, PixelFormat::Yuv420p);
        let stages = plan_stages(src, &resolved(640, 480, PixelFormat::Yuv420p), true);
        assert!(stages.is_empty());
    }

    #[test]
    fn format_only_plan() {
        let src = FrameFormat::new(640, 480, PixelFormat::Yuv420p);
        let stages = plan_stages(src, &resolved(640, 480, PixelFormat::Rgb24), false);
        assert_eq!(stages, vec![FilterStage::Format(PixelFormat::Rgb24)]);
    }

    #[test]
    fn scale_only_plan() {
        let src = FrameFormat::new(640, 480, PixelFormat::Rgb24);
        let stages = plan_stages(src, &resolved(320, 240, PixelFormat::Rgb24), false);
        assert_eq!(
            stages,
            vec![FilterStage::Scale {
                width: 320,
                height: 240
            }]
        );
    }

    #[test]
    fn same_aspect_ratio_skips_padding_even_with_keep_ar() {
        let src = FrameFormat::new(640, 480, PixelFormat::Rgb24);
        let stages = plan_stages(src, &resolved(320, 240, PixelFormat::Rgb24), true);
        assert_eq!(
            stages,
            vec![FilterStage::Scale {
                width: 320,
                height: 240
            }]
        );
    }

    #[test]
    fn letterbox_plan_is_scale_then_pad_then_format() {
        let src = FrameFormat::new(1920, 1080, PixelFormat::Yuv420p);
        let stages = plan_stages(src, &resolved(224, 224, PixelFormat::Rgb24), true);
        assert_eq!(stages.len(), 3);
        assert!(matches!(stages[0], FilterStage::Scale { width: 224, .. }));
        assert!(matches!(
            stages[1],
            FilterStage::Pad {
                width: 224,
                height: 224,
                x: 0,
                ..
            }
        ));
        assert_eq!(stages[2], FilterStage::Format(PixelFormat::Rgb24));
    }

    #[test]
    fn keep_ar_disabled_stretches() {
        let src = FrameFormat::new(1920, 1080, PixelFormat::Rgb24);
        let stages = plan_stages(src, &resolved(224, 224, PixelFormat::Rgb24), false);
        assert_eq!(
            stages,
            vec![FilterStage::Scale {
                width: 224,
                height: 224
            }]
        );
    }

    #[test]
    fn plan_from_resolved_target_geometry() {
        // End-to-end planning as FrameSource does it: derive, resolve, plan.
        let target = TargetGeometry::new(2, 2, PixelFormat::Gray8).resolve(4, 4);
        let src = FrameFormat::new(4, 4, PixelFormat::Rgb24);
        let stages = plan_stages(src, &target, true);
        assert_eq!(
            stages,
            vec![
                FilterStage::Scale {
                    width: 2,
                    height: 2
                },
                FilterStage::Format(PixelFormat::Gray8),
            ]
        );
    }

    #[test]
    fn render_empty_plan_is_null_filter() {
        assert_eq!(render_spec(&[]), "null");
    }

    #[test]
    fn render_full_chain() {
        let stages = [
            FilterStage::Scale {
                width: 224,
                height: 126,
            },
            FilterStage::Pad {
                width: 224,
                height: 224,
                x: 0,
                y: 49,
            },
            FilterStage::Format(PixelFormat::Gray8),
        ];
        assert_eq!(
            render_spec(&stages),
            "scale=w=224:h=126,pad=224:224:0:49:black,format=gray"
        );
    }
}
