//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! FITS image format handling code (low-level).
//!

use super::{Image, PixelFormat};
use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::raw::{c_int, c_long};
use fitsio_sys;

const TFLOAT: c_int = 42;
const FLOAT_IMG: c_int = -32;

#[derive(Debug)]
pub enum FitsError {
    CannotOpenFile,
    InvalidImage,
    CannotReadImage,
    CannotCreateFile,
    CannotCreateImage,
    CannotWriteImage
}

struct FitsFileHandle {
    fptr: *mut fitsio_sys::fitsfile
}

impl FitsFileHandle {
    /// Closes the file (flushing buffered data); returns the CFITSIO status on failure.
    fn close(mut self) -> Result<(), c_int> {
        let mut status = 0;
        unsafe { fitsio_sys::ffclos(self.fptr, &mut status) };
        self.fptr = std::ptr::null_mut();
        if status == 0 { Ok(()) } else { Err(status) }
    }
}

impl Drop for FitsFileHandle {
    fn drop(&mut self) {
        if !self.fptr.is_null() {
            let mut status = 0;
            unsafe { fitsio_sys::ffclos(self.fptr, &mut status) };
        }
    }
}

/// Opens the primary HDU; returns (file, width, height).
fn open_fits_file(file_name: &str) -> Result<(FitsFileHandle, u32, u32), FitsError> {
    let file_name_image0 = CString::new(file_name.to_string() + "[0]").map_err(|_| FitsError::CannotOpenFile)?;
    let mut file = FitsFileHandle{ fptr: std::ptr::null_mut() };
    let mut status = 0;
    const READONLY: c_int = 0;
    unsafe { fitsio_sys::ffopen(
        &mut file.fptr as *mut *mut _,
        file_name_image0.as_ptr(),
        READONLY,
        &mut status
    ) };
    if status != 0 { return Err(FitsError::CannotOpenFile); }

    let mut bits_per_pixel = MaybeUninit::<c_int>::uninit();
    let mut num_axes = MaybeUninit::<c_int>::uninit();
    let mut dimensions: [c_long; 3] = [0; 3];
    unsafe { fitsio_sys::ffghpr(
        file.fptr as *mut _,
        3,
        std::ptr::null_mut(),
        bits_per_pixel.as_mut_ptr(),
        num_axes.as_mut_ptr(),
        dimensions.as_mut_ptr(),
        std::ptr::null_mut(),
        std::ptr::null_mut(),
        std::ptr::null_mut(),
        &mut status
    ) };
    if status != 0 {
        return Err(FitsError::InvalidImage);
    }
    let num_axes = unsafe { num_axes.assume_init() };

    if num_axes != 2 || dimensions[0] <= 0 || dimensions[1] <= 0 {
        return Err(FitsError::InvalidImage);
    }

    Ok((file, dimensions[0] as u32, dimensions[1] as u32))
}

/// Loads the primary image; values of any FITS data type are converted to `Mono32f` by CFITSIO.
pub fn load_fits(file_name: &str) -> Result<Image, FitsError> {
    let (file, width, height) = open_fits_file(file_name)?;

    let mut image = Image::new(width, height, PixelFormat::Mono32f);

    let mut status = 0;

    // FITS rows are stored in reverse order
    for y in 0..height {
        unsafe { fitsio_sys::ffgpv(
            file.fptr as *mut _,
            TFLOAT,
            (1 + y as i64 * width as i64) as _,
            width as _,
            std::ptr::null_mut(),
            image.line_mut::<f32>(height - 1 - y).as_mut_ptr() as *mut _,
            std::ptr::null_mut(),
            &mut status
        ) };
        if status != 0 {
            return Err(FitsError::CannotReadImage);
        }
    }

    Ok(image)
}

/// Saves `image` as 32-bit floating point FITS; other pixel formats are converted first.
pub fn save_fits(image: &Image, file_name: &str) -> Result<(), FitsError> {
    let converted;
    let image = if image.pixel_format() == PixelFormat::Mono32f {
        image
    } else {
        converted = image.to_mono32f();
        &converted
    };

    let mut dimensions: [c_long; 2] = [
        image.width() as _,
        image.height() as _
    ];

    // a leading "!" overwrites an existing file
    let file_name = CString::new("!".to_string() + file_name).map_err(|_| FitsError::CannotCreateFile)?;
    let mut status = 0;
    let mut file = FitsFileHandle{ fptr: std::ptr::null_mut() };
    unsafe { fitsio_sys::ffinit(
        &mut file.fptr as *mut *mut _,
        file_name.as_ptr(),
        &mut status
    ) };
    if status != 0 { return Err(FitsError::CannotCreateFile); }

    unsafe { fitsio_sys::ffcrim(file.fptr as *mut _, FLOAT_IMG, 2, dimensions.as_mut_ptr(), &mut status) };
    if status != 0 { return Err(FitsError::CannotCreateImage); }

    // FITS rows are stored in reverse order
    for y in 0..image.height() {
        unsafe { fitsio_sys::ffppr(
            file.fptr as *mut _,
            TFLOAT,
            (1 + (image.height() - 1 - y) as i64 * image.width() as i64) as _,
            image.width() as _,
            image.line::<f32>(y).as_ptr() as *mut _,
            &mut status
        ) };
        if status != 0 { return Err(FitsError::CannotWriteImage); }
    }

    file.close().map_err(|_| FitsError::CannotWriteImage)
}
