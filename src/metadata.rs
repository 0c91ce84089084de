/*
 *  metadata.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Static now-playing metadata
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::HashMap;

use crate::display::traits::{MetaField, MetadataSource};

/// Fixed track details
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticMetadata {
    fields: HashMap<MetaField, String>,
    position: f32,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: MetaField, text: impl Into<String>) -> Self {
        self.set(field, text);
        self
    }

    pub fn set(&mut self, field: MetaField, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            self.fields.remove(&field);
        } else {
            self.fields.insert(field, text);
        }
    }

    pub fn set_position(&mut self, position: f32) {
        self.position = if position.is_finite() { position.clamp(0.0, 1.0) } else { 0.0 };
    }
}

impl MetadataSource for StaticMetadata {
    fn text(&self, field: MetaField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    fn position(&self) -> f32 {
        self.position
    }
}
