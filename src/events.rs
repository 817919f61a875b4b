use image::RgbaImage;

use crate::composition::Composition;
use crate::error::CompositionError;

#[derive(Debug)]
pub struct ExportRequest {
    pub id: u64,
    pub composition: Composition,
    pub scale: f64,
}

#[derive(Debug)]
pub struct ExportFinished {
    pub id: u64,
    pub result: Result<RgbaImage, CompositionError>,
}
