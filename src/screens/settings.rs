//! Settings screen: temperature unit selection.

use crate::driver::{Key, Locator, Screen};
use crate::error::TesterError;
use anyhow::Result;
use std::str::FromStr;

const CUSTOMIZE_UNITS: &str = r#"//android.widget.TextView[@text="Customize units"]"#;
const UNIT_TOGGLE: &str = r#"//android.view.ViewGroup[@content-desc="{unit}"]"#;

/// Temperature unit offered by the app's unit toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempUnit {
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    /// Symbol as rendered in the app UI.
    pub fn symbol(&self) -> &'static str {
        match self {
            TempUnit::Celsius => "°C",
            TempUnit::Fahrenheit => "°F",
        }
    }
}

impl FromStr for TempUnit {
    type Err = TesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "°C" => Ok(TempUnit::Celsius),
            "°F" => Ok(TempUnit::Fahrenheit),
            other => Err(TesterError::InvalidArgument(format!(
                "unit must be '°C' or '°F', got '{other}'"
            ))),
        }
    }
}

pub struct SettingsScreen<'d> {
    screen: &'d Screen<'d>,
}

impl<'d> SettingsScreen<'d> {
    pub fn new(screen: &'d Screen<'d>) -> Self {
        Self { screen }
    }

    pub fn customize_units() -> Locator {
        Locator::xpath(CUSTOMIZE_UNITS)
    }

    pub fn unit_toggle(unit: TempUnit) -> Locator {
        Locator::xpath(UNIT_TOGGLE.replace("{unit}", unit.symbol()))
    }

    /// Open the "Customize units" section.
    pub async fn open_customize_units(&self) -> Result<()> {
        self.screen.click(Self::customize_units()).await
    }

    /// Select the temperature unit by clicking its toggle.
    pub async fn set_temperature_unit(&self, unit: TempUnit) -> Result<()> {
        self.screen.click(Self::unit_toggle(unit)).await
    }

    /// Navigate back to the home screen.
    pub async fn return_to_home(&self) -> Result<()> {
        self.screen.send_key(Key::Back).await
    }
}
