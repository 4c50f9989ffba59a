// SPDX-License-Identifier: MIT

//! Closed parameter sets accepted by the keyword tools.

use std::fmt;
use std::str::FromStr;

/// Market/language codes the API serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Cs,
    Sk,
    Pl,
    Hu,
    Ro,
    Gb,
    Us,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Cs,
        Language::Sk,
        Language::Pl,
        Language::Hu,
        Language::Ro,
        Language::Gb,
        Language::Us,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::Cs => "cs",
            Language::Sk => "sk",
            Language::Pl => "pl",
            Language::Hu => "hu",
            Language::Ro => "ro",
            Language::Gb => "gb",
            Language::Us => "us",
        }
    }

    pub fn codes() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.code()).collect()
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| {
                format!(
                    "Unsupported language: {}. Supported languages: {}",
                    s,
                    Self::codes().join(", ")
                )
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Flavours of keyword suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionsType {
    Questions,
    New,
    Trending,
}

impl SuggestionsType {
    pub const ALL: [SuggestionsType; 3] = [
        SuggestionsType::Questions,
        SuggestionsType::New,
        SuggestionsType::Trending,
    ];

    pub fn code(self) -> &'static str {
        match self {
            SuggestionsType::Questions => "questions",
            SuggestionsType::New => "new",
            SuggestionsType::Trending => "trending",
        }
    }

    pub fn codes() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.code()).collect()
    }
}

impl FromStr for SuggestionsType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| {
                format!(
                    "Unsupported suggestions type: {}. Supported types: {}",
                    s,
                    Self::codes().join(", ")
                )
            })
    }
}

impl fmt::Display for SuggestionsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
