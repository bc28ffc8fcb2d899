//! Convolutional classifier network.
//!
//! The candle counterpart of the trained classifier: a compact
//! depthwise-separable CNN sized from the artifact's `config.json`. Weight
//! names (`stem`, `blocks.N.depthwise`, `blocks.N.pointwise`, `head`) are
//! part of the artifact contract.

use candle_core::{Module, Tensor, D};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};

use crate::model::metadata::ModelConfig;

struct SeparableBlock {
    depthwise: Conv2d,
    pointwise: Conv2d,
}

impl SeparableBlock {
    fn load(
        in_channels: usize,
        out_channels: usize,
        vb: VarBuilder,
    ) -> candle_core::Result<Self> {
        let depthwise = conv2d(
            in_channels,
            in_channels,
            3,
            Conv2dConfig {
                padding: 1,
                stride: 2,
                groups: in_channels,
                ..Default::default()
            },
            vb.pp("depthwise"),
        )?;
        let pointwise = conv2d(
            in_channels,
            out_channels,
            1,
            Conv2dConfig::default(),
            vb.pp("pointwise"),
        )?;
        Ok(Self {
            depthwise,
            pointwise,
        })
    }
}

impl Module for SeparableBlock {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = self.depthwise.forward(xs)?.relu()?;
        self.pointwise.forward(&xs)?.relu()
    }
}

pub struct ClassifierNetwork {
    stem: Conv2d,
    blocks: Vec<SeparableBlock>,
    head: Linear,
    num_classes: usize,
}

impl ClassifierNetwork {
    pub fn load(config: &ModelConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let stem = conv2d(
            3,
            config.stem_channels,
            3,
            Conv2dConfig {
                padding: 1,
                stride: 2,
                ..Default::default()
            },
            vb.pp("stem"),
        )?;

        let mut blocks = Vec::with_capacity(config.block_channels.len());
        let mut in_channels = config.stem_channels;
        for (index, &out_channels) in config.block_channels.iter().enumerate() {
            blocks.push(SeparableBlock::load(
                in_channels,
                out_channels,
                vb.pp(format!("blocks.{index}")),
            )?);
            in_channels = out_channels;
        }

        let head = linear(in_channels, config.classes.len(), vb.pp("head"))?;

        Ok(Self {
            stem,
            blocks,
            head,
            num_classes: config.classes.len(),
        })
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// One forward pass. Input is NCHW f32; output is `(batch, classes)`
    /// logits, softmax applied by the caller.
    pub fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let mut xs = self.stem.forward(xs)?.relu()?;
        for block in &self.blocks {
            xs = block.forward(&xs)?;
        }
        // Global average pool over both spatial dimensions.
        let xs = xs.mean(D::Minus1)?.mean(D::Minus1)?;
        self.head.forward(&xs)
    }
}
