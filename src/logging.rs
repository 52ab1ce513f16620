//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Logger struct.
//!

#[derive(Copy, Clone, Debug, strum_macros::EnumIter, PartialEq)]
pub enum Level {
    Quiet,
    Info,
    Verbose
}

pub struct Logger {
    level: Level
}

impl Logger {
    pub fn new(level: Level) -> Logger { Logger{ level } }

    pub fn is_verbose(&self) -> bool { self.level == Level::Verbose }

    pub fn info(&self, msg: &str) {
        if self.level as i32 >= Level::Info as i32 {
            println!("{}", msg);
        }
    }

    /// Use `is_verbose` first if building `msg` is expensive.
    pub fn verbose(&self, msg: &str) {
        if self.is_verbose() {
            println!("{}", msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_quiet_level_not_verbose() {
        assert!(!Logger::new(Level::Quiet).is_verbose());
        assert!(!Logger::new(Level::Info).is_verbose());
        assert!(Logger::new(Level::Verbose).is_verbose());
    }

    #[test]
    fn levels_are_ordered_by_amount_of_messages() {
        assert!((Level::Quiet as i32) < (Level::Info as i32));
        assert!((Level::Info as i32) < (Level::Verbose as i32));
    }
}
