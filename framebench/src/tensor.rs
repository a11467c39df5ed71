/*!
    Frame-to-tensor conversion.
*/

use framepipe_types::{PixelFormat, VideoFrame};

/**
    Element type of a tensor.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DType {
    U8,
    F32,
}

/**
    Input geometry a model declares, negotiated once before the run.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorSpec {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub dtype: DType,
}

impl TensorSpec {
    /**
        The pixel format frames must arrive in to fill this tensor.

        # Panics

        Panics on channel counts other than 1 (grayscale) or 3 (RGB);
        a model declaring anything else violates the interface contract.
    */
    pub fn pixel_format(&self) -> PixelFormat {
        match self.channels {
            3 => PixelFormat::Rgb24,
            1 => PixelFormat::Gray8,
            other => panic!("model declares {other} input channels, expected 1 or 3"),
        }
    }

    /**
        Frame source target geometry matching this input.

        Callers wanting letterboxing add `.with_keep_aspect_ratio()`.
    */
    pub fn target_geometry(&self) -> framepipe_types::TargetGeometry {
        framepipe_types::TargetGeometry::new(
            self.width as u32,
            self.height as u32,
            self.pixel_format(),
        )
    }

    /// Elements in one batch-1 tensor of this spec.
    pub fn element_count(&self) -> usize {
        self.height * self.width * self.channels
    }
}

/**
    Tensor element storage.
*/
#[derive(Clone, Debug, PartialEq)]
pub enum TensorData {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

/**
    A batch-1 NHWC tensor.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    /// `[batch, height, width, channels]`; batch is always 1 here.
    pub shape: [usize; 4],
    pub data: TensorData,
}

impl Tensor {
    pub fn dtype(&self) -> DType {
        match self.data {
            TensorData::U8(_) => DType::U8,
            TensorData::F32(_) => DType::F32,
        }
    }

    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

static_assertions::assert_impl_all!(Tensor: Send, Sync);

/**
    Convert a decoded frame into the model's input tensor.

    Byte values are copied verbatim for `U8` inputs and normalized with a
    fixed `/ 256.0` divisor for `F32` inputs.

    # Panics

    Panics when the frame's geometry, pixel format, or buffer length does
    not match `spec`; frames reaching this point were produced by a source
    configured from the same spec, so a mismatch is a programming error.
*/
pub fn frame_to_tensor(frame: &VideoFrame, spec: &TensorSpec) -> Tensor {
    assert_eq!(
        (frame.width as usize, frame.height as usize),
        (spec.width, spec.height),
        "frame geometry does not match model input",
    );
    assert_eq!(
        frame.format,
        spec.pixel_format(),
        "frame pixel format does not match model input",
    );
    assert_eq!(
        frame.data.len(),
        frame.expected_data_len(),
        "frame buffer is not tightly packed",
    );

    let shape = [1, spec.height, spec.width, spec.channels];
    let data = match spec.dtype {
        DType::U8 => TensorData::U8(frame.data.clone()),
        DType::F32 => TensorData::F32(
            frame
                .data
                .iter()
                .map(|&byte| f32::from(byte) / 256.0)
                .collect(),
        ),
    };

    Tensor { shape, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framepipe_types::Rational;

    const TB: Rational = Rational { num: 1, den: 25 };

    fn gray_spec(dtype: DType) -> TensorSpec {
        TensorSpec {
            height: 2,
            width: 3,
            channels: 1,
            dtype,
        }
    }

    fn gray_frame() -> VideoFrame {
        let mut frame = VideoFrame::blank(3, 2, PixelFormat::Gray8, TB);
        frame.data.copy_from_slice(&[0, 1, 2, 128, 254, 255]);
        frame
    }

    #[test]
    fn u8_conversion_copies_bytes() {
        let tensor = frame_to_tensor(&gray_frame(), &gray_spec(DType::U8));
        assert_eq!(tensor.shape, [1, 2, 3, 1]);
        assert_eq!(tensor.dtype(), DType::U8);
        assert_eq!(tensor.data, TensorData::U8(vec![0, 1, 2, 128, 254, 255]));
    }

    #[test]
    fn f32_conversion_normalizes_by_256() {
        let tensor = frame_to_tensor(&gray_frame(), &gray_spec(DType::F32));
        let TensorData::F32(values) = tensor.data else {
            panic!("expected f32 data");
        };
        assert_eq!(values[0], 0.0);
        assert_eq!(values[3], 0.5);
        assert_eq!(values[5], 255.0 / 256.0);
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn rgb_spec_maps_to_rgb24() {
        let spec = TensorSpec {
            height: 4,
            width: 4,
            channels: 3,
            dtype: DType::U8,
        };
        assert_eq!(spec.pixel_format(), PixelFormat::Rgb24);
        assert_eq!(spec.element_count(), 48);
        let geometry = spec.target_geometry();
        assert_eq!((geometry.width, geometry.height), (4, 4));
        assert!(!geometry.keep_aspect_ratio);
    }

    #[test]
    #[should_panic(expected = "input channels")]
    fn four_channel_spec_is_a_contract_violation() {
        let spec = TensorSpec {
            height: 2,
            width: 2,
            channels: 4,
            dtype: DType::U8,
        };
        let _ = spec.pixel_format();
    }

    #[test]
    #[should_panic(expected = "geometry")]
    fn mismatched_frame_geometry_panics() {
        let spec = TensorSpec {
            height: 8,
            width: 8,
            channels: 1,
            dtype: DType::U8,
        };
        let _ = frame_to_tensor(&gray_frame(), &spec);
    }

    #[test]
    #[should_panic(expected = "pixel format")]
    fn mismatched_pixel_format_panics() {
        let frame = VideoFrame::blank(3, 2, PixelFormat::Rgb24, TB);
        let _ = frame_to_tensor(&frame, &gray_spec(DType::U8));
    }
}
