// Preview window for the demo binary.
// Shows a heatmap flattened over a dark background; ESC or closing the window ends it.

use crate::error::Error;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

pub struct Preview {
    window: Window,
}

impl Preview {
    /// Open a window sized to the raster.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width.max(1), height.max(1), WindowOptions::default())
            .map_err(|e| Error::Window(e.to_string()))?;
        window.set_target_fps(30);
        Ok(Self { window })
    }

    /// Push this frame's pixels to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::Window(e.to_string()))
    }

    /// False once the user closes the window or presses ESC.
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    // R: reshuffle the points
    pub fn r_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::R, KeyRepeat::No)
    }
}
