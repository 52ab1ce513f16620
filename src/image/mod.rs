//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Scalar image data structure, geometry and I/O.
//!

mod fits;

pub mod point;

pub use fits::FitsError;
pub use point::{Point, Rect};
use cgmath::{Matrix2, SquareMatrix, Vector2};
use num_traits::ToPrimitive;
use std::any::Any;
use std::slice;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    Mono8,
    Mono16,
    Mono32f,
    Mono64f
}

pub fn get_matching_mono_format<T: Default + Any>() -> PixelFormat {
    let t = &T::default() as &dyn Any;
    if t.is::<u8>() {
        PixelFormat::Mono8
    } else if t.is::<u16>() {
        PixelFormat::Mono16
    } else if t.is::<f32>() {
        PixelFormat::Mono32f
    } else if t.is::<f64>() {
        PixelFormat::Mono64f
    } else {
        panic!("Unsupported type.")
    }
}

/// Asserts that `T` is the type of pixel values corresponding to `pix_fmt`.
fn verify_pix_type<T: Default + Any>(pix_fmt: PixelFormat) {
    assert!(get_matching_mono_format::<T>() == pix_fmt);
}

pub fn bytes_per_pixel(pix_fmt: PixelFormat) -> usize {
    match pix_fmt {
        PixelFormat::Mono8   => 1,
        PixelFormat::Mono16  => 2,
        PixelFormat::Mono32f => 4,
        PixelFormat::Mono64f => 8
    }
}

/// Mapping between pixel indices and physical coordinates.
///
/// physical = origin + direction * (index * spacing), with the multiplication by `spacing` done per axis.
///
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Geometry {
    pub origin: Vector2<f64>,
    pub spacing: Vector2<f64>,
    pub direction: Matrix2<f64>
}

impl Default for Geometry {
    fn default() -> Geometry {
        Geometry{
            origin: Vector2{ x: 0.0, y: 0.0 },
            spacing: Vector2{ x: 1.0, y: 1.0 },
            direction: Matrix2::identity()
        }
    }
}

impl Geometry {
    pub fn index_to_physical(&self, index: &Vector2<f64>) -> Vector2<f64> {
        self.origin + self.direction * Vector2{ x: index.x * self.spacing.x, y: index.y * self.spacing.y }
    }
}

#[derive(Debug)]
pub enum ImageError {
    FitsError(FitsError)
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::FitsError(e) => write!(f, "FITS error: {:?}", e)
        }
    }
}

impl std::error::Error for ImageError {}

/// Single-channel image.
///
/// Pixels are stored row by row without padding. The storage is a `Vec<u64>`, so that it is suitably
/// aligned for every supported pixel type.
///
#[derive(Clone)]
pub struct Image {
    width: u32,
    height: u32,
    pix_fmt: PixelFormat,
    geometry: Geometry,
    words: Vec<u64>
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Image {}x{}, {:?}, origin = ({}, {}), spacing = ({}, {})",
            self.width,
            self.height,
            self.pix_fmt,
            self.geometry.origin.x, self.geometry.origin.y,
            self.geometry.spacing.x, self.geometry.spacing.y
        )
    }
}

impl Image {
    /// Creates a new zero-filled image.
    pub fn new(width: u32, height: u32, pix_fmt: PixelFormat) -> Image {
        let byte_count = width as usize * height as usize * bytes_per_pixel(pix_fmt);
        Image{
            width,
            height,
            pix_fmt,
            geometry: Geometry::default(),
            words: vec![0; (byte_count + 7) / 8]
        }
    }

    /// Creates an image from row-major `values`; the pixel format is determined by `T`.
    #[cfg(test)]
    pub fn new_from_values<T: Any + Default + Copy>(width: u32, height: u32, values: &[T]) -> Image {
        assert!(values.len() == width as usize * height as usize);
        let mut image = Image::new(width, height, get_matching_mono_format::<T>());
        image.pixels_mut::<T>().copy_from_slice(values);
        image
    }

    /// Creates a zero-filled image of the same size and geometry.
    pub fn new_like(other: &Image, pix_fmt: PixelFormat) -> Image {
        let mut image = Image::new(other.width, other.height, pix_fmt);
        image.geometry = other.geometry;
        image
    }

    pub fn load(file_name: &str) -> Result<Image, ImageError> {
        fits::load_fits(file_name).map_err(ImageError::FitsError)
    }

    /// Overwrites existing file.
    pub fn save(&self, file_name: &str) -> Result<(), ImageError> {
        fits::save_fits(self, file_name).map_err(ImageError::FitsError)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pix_fmt
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[cfg(test)]
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub fn img_rect(&self) -> Rect {
        Rect{ x: 0, y: 0, width: self.width, height: self.height }
    }

    /// Returns all pixels, row by row.
    ///
    /// `T` must correspond to the image's pixel format.
    ///
    pub fn pixels<T: Any + Default>(&self) -> &[T] {
        verify_pix_type::<T>(self.pix_fmt);

        let ptr = self.words.as_ptr() as *const T;
        unsafe { slice::from_raw_parts(ptr, self.width as usize * self.height as usize) }
    }

    /// Returns all mutable pixels, row by row.
    ///
    /// `T` must correspond to the image's pixel format.
    ///
    pub fn pixels_mut<T: Any + Default>(&mut self) -> &mut [T] {
        verify_pix_type::<T>(self.pix_fmt);

        let ptr = self.words.as_mut_ptr() as *mut T;
        unsafe { slice::from_raw_parts_mut(ptr, self.width as usize * self.height as usize) }
    }

    /// Returns image line.
    ///
    /// `T` must correspond to the image's pixel format.
    ///
    pub fn line<T: Any + Default>(&self, y: u32) -> &[T] {
        assert!(y < self.height);
        let w = self.width as usize;
        &self.pixels::<T>()[y as usize * w..(y as usize + 1) * w]
    }

    /// Returns mutable image line.
    ///
    /// `T` must correspond to the image's pixel format.
    ///
    pub fn line_mut<T: Any + Default>(&mut self, y: u32) -> &mut [T] {
        assert!(y < self.height);
        let w = self.width as usize;
        &mut self.pixels_mut::<T>()[y as usize * w..(y as usize + 1) * w]
    }

    /// Returns the value at `pos` or `None` if `pos` lies outside the image.
    pub fn value_at<T: Any + Default + Copy>(&self, pos: &Point) -> Option<T> {
        if self.img_rect().contains_point(pos) {
            Some(self.pixels::<T>()[pos.y as usize * self.width as usize + pos.x as usize])
        } else {
            None
        }
    }

    /// Returns a `Mono32f` copy of the image (or a clone if it already is `Mono32f`).
    pub fn to_mono32f(&self) -> Image {
        match self.pix_fmt {
            PixelFormat::Mono8 => self.convert_values_to_f32::<u8>(),
            PixelFormat::Mono16 => self.convert_values_to_f32::<u16>(),
            PixelFormat::Mono32f => self.clone(),
            PixelFormat::Mono64f => self.convert_values_to_f32::<f64>()
        }
    }

    fn convert_values_to_f32<T: Any + Default + Copy + ToPrimitive>(&self) -> Image {
        let mut result = Image::new_like(self, PixelFormat::Mono32f);
        for (dest, src) in result.pixels_mut::<f32>().iter_mut().zip(self.pixels::<T>().iter()) {
            *dest = src.to_f32().unwrap_or(std::f32::NAN);
        }
        result
    }
}
