pub mod config;
pub mod csv_loader;
pub mod descriptor;
pub mod ocr;
pub mod pipeline;
pub mod translator;

pub use config::{AppConfig, ConfigError};
pub use csv_loader::{
    load_airports, load_airports_with, load_regions, load_regions_with, read_airports,
    read_airports_with, read_regions, read_regions_with, Airport, AirportMap, LoadError,
    LoadOptions, Region, RegionLabel, RegionMap,
};
pub use descriptor::{AirportDescriptor, RegionDescriptor};
pub use ocr::{extract_text_from_image, OcrError, OcrResult, TextExtractor, VisionClient};
pub use pipeline::translate_image;
pub use translator::{translate_text, Translate, TranslateError, TranslatorClient};
