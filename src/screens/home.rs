//! Home screen of the weather app: temperature readout and city search.

use crate::driver::{Key, Locator, Screen, WaitMode};
use crate::error::TesterError;
use anyhow::Result;

const TEMPERATURE_READOUT: &str = r#"(//android.widget.TextView[contains(@text, "°")])[1]"#;
// Content-desc matches, addressed by accessibility id.
const SETTINGS_BUTTON: &str = "Go to settings";
const SEARCH_ICON: &str = "Search";
const SEARCH_INPUT: &str = r#"//android.widget.EditText[@text="Search"]"#;
const SEARCH_SUGGESTION: &str = r#"(//android.widget.TextView[contains(@text, "{city}")])[1]"#;

pub struct HomeScreen<'d> {
    screen: &'d Screen<'d>,
}

impl<'d> HomeScreen<'d> {
    pub fn new(screen: &'d Screen<'d>) -> Self {
        Self { screen }
    }

    pub fn temperature_readout() -> Locator {
        Locator::xpath(TEMPERATURE_READOUT)
    }

    pub fn settings_button() -> Locator {
        Locator::accessibility_id(SETTINGS_BUTTON)
    }

    pub fn search_icon() -> Locator {
        Locator::accessibility_id(SEARCH_ICON)
    }

    pub fn search_input() -> Locator {
        Locator::xpath(SEARCH_INPUT)
    }

    /// First suggestion row matching a searched city name.
    pub fn suggestion_for(city: &str) -> Locator {
        Locator::xpath(SEARCH_SUGGESTION.replace("{city}", city))
    }

    /// Navigate to the settings screen.
    pub async fn open_settings(&self) -> Result<()> {
        self.screen.click(Self::settings_button()).await
    }

    /// Temperature currently displayed on the home screen.
    ///
    /// Strips the degree suffix and surrounding whitespace, then parses the
    /// remainder as an integer.
    pub async fn displayed_temperature(&self) -> Result<i32> {
        let raw = self.screen.read_text(Self::temperature_readout()).await?;
        parse_temperature(&raw)
    }

    /// Search each city in order and read its displayed temperature.
    ///
    /// Per city: open the search affordance, focus the input, type the name,
    /// confirm with Enter, pick the first matching suggestion, wait for the
    /// readout, read it. The result keeps input order. The first timeout or
    /// parse failure aborts the whole batch; nothing partial is returned.
    pub async fn search_city_temperatures(&self, cities: &[&str]) -> Result<Vec<(String, i32)>> {
        let mut temperatures = Vec::with_capacity(cities.len());

        for city in cities {
            self.screen.click(Self::search_icon()).await?;
            self.screen.click(Self::search_input()).await?;
            self.screen.enter_text(Self::search_input(), city).await?;
            self.screen.send_key(Key::Enter).await?;

            self.screen.click(Self::suggestion_for(city)).await?;

            // Block until the readout has re-rendered for the new city.
            self.screen
                .resolve(&Self::temperature_readout(), WaitMode::Presence)
                .await?;
            let temp = self.displayed_temperature().await?;

            log::debug!("app temperature for {city}: {temp}");
            temperatures.push((city.to_string(), temp));
        }

        Ok(temperatures)
    }
}

/// Parse a displayed temperature like `"21°C "` into `21`.
fn parse_temperature(raw: &str) -> Result<i32> {
    let cleaned = raw.replace("°C", "").replace('°', "");
    cleaned
        .trim()
        .parse::<i32>()
        .map_err(|_| TesterError::Parse(raw.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{Interaction, MockDriver};
    use crate::driver::Screen;
    use std::time::Duration;

    fn script_search_ui(driver: &MockDriver) {
        driver.add_element(HomeScreen::search_icon(), "search-icon", WaitMode::Clickable, 0);
        driver.add_element(HomeScreen::search_input(), "search-input", WaitMode::Clickable, 0);
        driver.add_element(
            HomeScreen::temperature_readout(),
            "readout",
            WaitMode::Presence,
            0,
        );
    }

    #[test]
    fn content_desc_locators_use_accessibility_id() {
        use crate::driver::By;

        assert_eq!(HomeScreen::settings_button().by, By::AccessibilityId);
        assert_eq!(HomeScreen::settings_button().value, "Go to settings");
        assert_eq!(HomeScreen::search_icon().by, By::AccessibilityId);
        assert_eq!(HomeScreen::search_input().by, By::XPath);
    }

    #[test]
    fn parses_temperature_with_unit_suffix() {
        assert_eq!(parse_temperature("21°C ").unwrap(), 21);
        assert_eq!(parse_temperature("-3°C").unwrap(), -3);
        assert_eq!(parse_temperature(" 7° ").unwrap(), 7);
    }

    #[test]
    fn non_numeric_readout_is_a_parse_error() {
        let err = parse_temperature("abc").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TesterError>(),
            Some(TesterError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn search_returns_cities_in_input_order() {
        let driver = MockDriver::new();
        script_search_ui(&driver);
        driver.add_element(
            HomeScreen::suggestion_for("Paris"),
            "suggestion-paris",
            WaitMode::Clickable,
            0,
        );
        driver.add_element(
            HomeScreen::suggestion_for("Oslo"),
            "suggestion-oslo",
            WaitMode::Clickable,
            0,
        );
        driver.set_text_sequence("readout", &["10°C", "2°C"]);

        let screen = Screen::with_timeout(&driver, Duration::from_secs(1));
        let home = HomeScreen::new(&screen);

        let result = home.search_city_temperatures(&["Paris", "Oslo"]).await.unwrap();
        assert_eq!(
            result,
            vec![("Paris".to_string(), 10), ("Oslo".to_string(), 2)]
        );

        // Input was typed and confirmed for both cities.
        let journal = driver.journal();
        let typed: Vec<_> = journal
            .iter()
            .filter(|i| matches!(i, Interaction::ClearAndType(_, _)))
            .collect();
        assert_eq!(
            typed,
            vec![
                &Interaction::ClearAndType("search-input".to_string(), "Paris".to_string()),
                &Interaction::ClearAndType("search-input".to_string(), "Oslo".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn missing_suggestion_aborts_whole_batch() {
        let driver = MockDriver::new();
        script_search_ui(&driver);
        driver.add_element(
            HomeScreen::suggestion_for("Paris"),
            "suggestion-paris",
            WaitMode::Clickable,
            0,
        );
        // No suggestion scripted for Oslo: its click times out.
        driver.set_text("readout", "10°C");

        let screen = Screen::with_timeout(&driver, Duration::from_millis(50));
        let home = HomeScreen::new(&screen);

        let err = home
            .search_city_temperatures(&["Paris", "Oslo"])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TesterError>(),
            Some(TesterError::NotFound { .. })
        ));
    }
}
