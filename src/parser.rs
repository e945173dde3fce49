// 🏗️ Grid Parser + Record Builder
// Markup → labelled raw cells → TimeSlotRecord
//
// The booking widget renders every court as a run of tooltip cells with a title like
// "08:00–08:30 - Volno". Courts carry no explicit id, so court boundaries are inferred
// from the opening time recurring in the sequence.

use crate::config::{FacilityConfig, StatusVocabulary};
use crate::error::{Result, ScheduleError};
use crate::schedule::{CourtId, FacilityGrid, TimeSlotRecord, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use scraper::{Html, Selector};

// ============================================================================
// RAW CELL
// ============================================================================

/// One labelled cell as the parse collaborator hands it over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    /// Tooltip text, "HH:MM–HH:MM <status-text>"
    pub label: String,

    /// Explicit court number, when the markup provides one
    pub court_hint: Option<u32>,
}

impl RawCell {
    pub fn new(label: impl Into<String>) -> Self {
        RawCell {
            label: label.into(),
            court_hint: None,
        }
    }

    pub fn with_court(mut self, court: u32) -> Self {
        self.court_hint = Some(court);
        self
    }
}

/// Label split into its parts, status text still locale-specific
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLabel {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub status_text: String,
}

/// Parse "HH:MM–HH:MM <status>"; the status may be preceded by '-' or glued to the end time
pub fn parse_label(label: &str) -> Result<CellLabel> {
    let label = label.trim();
    let (start_text, rest) = label
        .split_once('–')
        .or_else(|| label.split_once('-'))
        .ok_or_else(|| ScheduleError::Parse(format!("label '{}' has no time range", label)))?;

    let rest = rest.trim_start();
    let end_len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == ':'))
        .unwrap_or(rest.len());
    let (end_text, status_text) = rest.split_at(end_len);

    let start = parse_time(start_text, label)?;
    let end = parse_time(end_text, label)?;
    let status_text = status_text.trim().trim_start_matches('-').trim().to_string();

    Ok(CellLabel {
        start,
        end,
        status_text,
    })
}

fn parse_time(text: &str, label: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), TIME_FORMAT)
        .map_err(|e| ScheduleError::Parse(format!("bad time '{}' in label '{}': {}", text.trim(), label, e)))
}

// ============================================================================
// COURT ASSIGNMENT
// ============================================================================

/// Court numbers by opening-time recurrence
///
/// Every time the earliest start time of the whole grid shows up again, a new court
/// begins. Cells before the first occurrence belong to court 1.
pub fn courts_by_opening_recurrence(starts: &[NaiveTime]) -> Vec<CourtId> {
    let Some(opening) = starts.iter().min().copied() else {
        return Vec::new();
    };

    let mut counter = 0u32;
    starts
        .iter()
        .map(|&start| {
            if start == opening {
                counter += 1;
            }
            CourtId(counter.max(1))
        })
        .collect()
}

// ============================================================================
// RECORD BUILDER
// ============================================================================

pub struct RawRecordBuilder {
    pub vocabulary: StatusVocabulary,
    pub grid: FacilityGrid,
}

impl RawRecordBuilder {
    pub fn new(vocabulary: StatusVocabulary, grid: FacilityGrid) -> Self {
        RawRecordBuilder { vocabulary, grid }
    }

    pub fn from_config(config: &FacilityConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.status.clone(), config.grid()?))
    }

    /// Decode the cells of one date into records, in input order
    pub fn build(&self, date: NaiveDate, cells: &[RawCell]) -> Result<Vec<TimeSlotRecord>> {
        if cells.is_empty() {
            return Err(ScheduleError::EmptySchedule);
        }

        let labels = cells
            .iter()
            .map(|cell| {
                let label = parse_label(&cell.label)?;
                self.check_label(&label, &cell.label)?;
                Ok(label)
            })
            .collect::<Result<Vec<_>>>()?;

        // explicit numbering only when every cell carries a usable one
        let hinted: Option<Vec<CourtId>> = cells
            .iter()
            .map(|c| c.court_hint.filter(|&n| n > 0).map(CourtId))
            .collect();
        let courts = match hinted {
            Some(courts) => courts,
            None => {
                let starts: Vec<NaiveTime> = labels.iter().map(|l| l.start).collect();
                courts_by_opening_recurrence(&starts)
            }
        };

        let records: Vec<TimeSlotRecord> = labels
            .into_iter()
            .zip(courts)
            .map(|(label, court)| TimeSlotRecord {
                start: label.start,
                end: label.end,
                status: self.vocabulary.classify(&label.status_text),
                court,
                date,
            })
            .collect();

        log::debug!(
            "{}: built {} records on {} courts",
            date,
            records.len(),
            records.iter().map(|r| r.court).max().map_or(0, |c| c.0)
        );
        Ok(records)
    }

    fn check_label(&self, label: &CellLabel, raw: &str) -> Result<()> {
        if label.start >= label.end {
            return Err(ScheduleError::Parse(format!("label '{}' does not move forward in time", raw)));
        }
        if !self.grid.is_aligned(label.start) || !self.grid.is_aligned(label.end) {
            return Err(ScheduleError::Parse(format!(
                "label '{}' is off the {}-minute grid",
                raw, self.grid.step_minutes
            )));
        }
        Ok(())
    }
}

// ============================================================================
// PARSE COLLABORATOR
// ============================================================================

/// Markup → ordered labelled cells
pub trait GridParser: Send + Sync {
    fn parse(&self, markup: &str) -> Result<Vec<RawCell>>;
}

/// Reads the tooltip `title` of every grid cell in document order
pub struct HtmlGridParser {
    selector: String,
    header_cells: usize,
}

impl HtmlGridParser {
    pub fn new(selector: impl Into<String>, header_cells: usize) -> Self {
        HtmlGridParser {
            selector: selector.into(),
            header_cells,
        }
    }

    pub fn from_config(config: &FacilityConfig) -> Self {
        Self::new(config.cell_selector.clone(), config.header_cells)
    }
}

impl GridParser for HtmlGridParser {
    fn parse(&self, markup: &str) -> Result<Vec<RawCell>> {
        let selector = Selector::parse(&self.selector)
            .map_err(|e| ScheduleError::Parse(format!("invalid cell selector '{}': {:?}", self.selector, e)))?;
        let document = Html::parse_document(markup);

        let mut cells = Vec::new();
        for (index, element) in document.select(&selector).enumerate().skip(self.header_cells) {
            let title = element
                .value()
                .attr("title")
                .ok_or_else(|| ScheduleError::Parse(format!("cell #{} has no title attribute", index)))?;
            let cell = RawCell::new(title.trim());
            // courts are 1-based; zero or garbage falls back to the recurrence rule
            let cell = match element
                .value()
                .attr("data-court")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|&n| n > 0)
            {
                Some(court) => cell.with_court(court),
                None => cell,
            };
            cells.push(cell);
        }

        log::debug!("parsed {} grid cells", cells.len());
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::CourtStatus;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 9).unwrap()
    }

    fn builder() -> RawRecordBuilder {
        RawRecordBuilder::new(StatusVocabulary::default(), FacilityGrid::default())
    }

    #[test]
    fn test_parse_label_variants() {
        let label = parse_label("08:00–08:30 - Volno ").unwrap();
        assert_eq!(label.start, t(8, 0));
        assert_eq!(label.end, t(8, 30));
        assert_eq!(label.status_text, "Volno");

        let glued = parse_label("21:30–22:00Zavřeno").unwrap();
        assert_eq!(glued.end, t(22, 0));
        assert_eq!(glued.status_text, "Zavřeno");

        let ascii = parse_label("10:00-11:30 Novák").unwrap();
        assert_eq!(ascii.end, t(11, 30));
        assert_eq!(ascii.status_text, "Novák");
    }

    #[test]
    fn test_parse_label_errors() {
        assert!(matches!(parse_label("Legenda"), Err(ScheduleError::Parse(_))));
        assert!(matches!(parse_label("08:00–xx Volno"), Err(ScheduleError::Parse(_))));
    }

    #[test]
    fn test_court_recurrence_rule() {
        let starts = [t(8, 0), t(8, 30), t(9, 0), t(8, 0), t(9, 0), t(8, 0)];
        let courts: Vec<u32> = courts_by_opening_recurrence(&starts).iter().map(|c| c.0).collect();
        assert_eq!(courts, vec![1, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_court_recurrence_leading_cells_belong_to_first_court() {
        let starts = [t(9, 0), t(8, 0), t(8, 30), t(8, 0)];
        let courts: Vec<u32> = courts_by_opening_recurrence(&starts).iter().map(|c| c.0).collect();
        assert_eq!(courts, vec![1, 1, 1, 2]);
        assert!(courts_by_opening_recurrence(&[]).is_empty());
    }

    #[test]
    fn test_build_records_normalizes_status() {
        let cells = vec![
            RawCell::new("08:00–08:30 - Volno"),
            RawCell::new("08:30–10:00 - Novák"),
            RawCell::new("10:00–10:30Zavřeno"),
            RawCell::new("08:00–08:30 - Volno"),
        ];
        let records = builder().build(date(), &cells).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].status, CourtStatus::Free);
        assert_eq!(records[1].status, CourtStatus::Booked);
        assert_eq!(records[1].end, t(10, 0));
        assert_eq!(records[2].status, CourtStatus::Closed);
        assert_eq!(records[2].court, CourtId(1));
        assert_eq!(records[3].court, CourtId(2));
        assert!(records.iter().all(|r| r.date == date()));
    }

    #[test]
    fn test_build_prefers_explicit_courts() {
        let cells = vec![
            RawCell::new("08:00–08:30 - Volno").with_court(4),
            RawCell::new("08:00–08:30 - Volno").with_court(7),
        ];
        let records = builder().build(date(), &cells).unwrap();
        assert_eq!(records[0].court, CourtId(4));
        assert_eq!(records[1].court, CourtId(7));

        // a partial set of hints falls back to the recurrence rule
        let mixed = vec![
            RawCell::new("08:00–08:30 - Volno").with_court(4),
            RawCell::new("08:00–08:30 - Volno"),
        ];
        let records = builder().build(date(), &mixed).unwrap();
        assert_eq!(records[0].court, CourtId(1));
        assert_eq!(records[1].court, CourtId(2));
    }

    #[test]
    fn test_build_empty_and_invalid() {
        assert!(matches!(builder().build(date(), &[]), Err(ScheduleError::EmptySchedule)));

        let backwards = vec![RawCell::new("09:00–08:30 - Volno")];
        assert!(matches!(builder().build(date(), &backwards), Err(ScheduleError::Parse(_))));

        let off_grid = vec![RawCell::new("08:15–08:45 - Volno")];
        assert!(matches!(builder().build(date(), &off_grid), Err(ScheduleError::Parse(_))));
    }

    #[test]
    fn test_html_parser_reads_titles_in_order() {
        let html = r#"
            <html><body>
              <div class="tooltip" title="Legenda"></div>
              <table><tr>
                <td class="empty tooltip" title=" 08:00–08:30 - Volno "></td>
                <td class="booked tooltip" title="08:30–09:00 - Novák"></td>
                <td class="other" title="ignored"></td>
              </tr></table>
              <a class="tooltip" title="09:00–09:30Zavřeno">x</a>
            </body></html>
        "#;
        let parser = HtmlGridParser::from_config(&FacilityConfig::default());
        let cells = parser.parse(html).unwrap();
        let labels: Vec<&str> = cells.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["08:00–08:30 - Volno", "08:30–09:00 - Novák", "09:00–09:30Zavřeno"]);
    }

    #[test]
    fn test_html_parser_missing_title_is_parse_error() {
        let html = r#"<div class="tooltip" title="Legenda"></div><div class="tooltip"></div>"#;
        let parser = HtmlGridParser::new("div.tooltip", 1);
        assert!(matches!(parser.parse(html), Err(ScheduleError::Parse(_))));
    }

    #[test]
    fn test_html_parser_reads_court_hint() {
        let html = r#"<div class="tooltip" data-court="3" title="08:00–08:30 - Volno"></div>"#;
        let parser = HtmlGridParser::new("div.tooltip", 0);
        let cells = parser.parse(html).unwrap();
        assert_eq!(cells, vec![RawCell::new("08:00–08:30 - Volno").with_court(3)]);
    }

    #[test]
    fn test_zero_court_hint_falls_back_to_recurrence() {
        let html = r#"
            <div class="tooltip" data-court="0" title="08:00–08:30 - Volno"></div>
            <div class="tooltip" data-court="0" title="08:00–08:30 - Volno"></div>
        "#;
        let cells = HtmlGridParser::new("div.tooltip", 0).parse(html).unwrap();
        assert!(cells.iter().all(|c| c.court_hint.is_none()));

        let records = builder().build(date(), &cells).unwrap();
        assert_eq!(records[0].court, CourtId(1));
        assert_eq!(records[1].court, CourtId(2));

        // a zero hint handed straight to the builder is not trusted either
        let direct = vec![
            RawCell::new("08:00–08:30 - Volno").with_court(0),
            RawCell::new("08:00–08:30 - Volno").with_court(5),
        ];
        let records = builder().build(date(), &direct).unwrap();
        assert_eq!(records[0].court, CourtId(1));
        assert_eq!(records[1].court, CourtId(2));
    }

    #[test]
    fn test_html_parser_no_cells_is_empty_not_error() {
        let parser = HtmlGridParser::from_config(&FacilityConfig::default());
        assert!(parser.parse("<html><body>Nothing today</body></html>").unwrap().is_empty());
    }
}
