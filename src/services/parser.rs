//! Rule-based extraction of an [`Intent`] from free text.
//!
//! Every field is resolved by walking an ordered table of patterns; the first
//! rule that yields a value wins and later rules are never consulted. Fields
//! are resolved independently of each other.

use regex::{Captures, Regex};

use crate::models::{EventCategory, Intent, TimeConstraint, TransportMode};

const CATEGORY_KEYWORDS: &[(EventCategory, &[&str])] = &[
    (
        EventCategory::Vintage,
        &["vintage", "antique", "retro", "flea market", "thrift", "collector"],
    ),
    (
        EventCategory::Food,
        &["food", "restaurant", "cafe", "bar", "festival", "truck", "dining"],
    ),
    (
        EventCategory::Art,
        &["art", "gallery", "museum", "exhibition", "show", "performance"],
    ),
    (
        EventCategory::Music,
        &["music", "concert", "band", "dj", "live", "performance"],
    ),
    (
        EventCategory::Fitness,
        &["fitness", "yoga", "gym", "workout", "sports", "athletic"],
    ),
    (
        EventCategory::Culture,
        &["culture", "cultural", "heritage", "tradition", "festival"],
    ),
];

const NAMED_AREAS: &[&str] = &[
    "manhattan",
    "brooklyn",
    "queens",
    "bronx",
    "staten island",
    "nyc",
    "new york",
];

const AREA_COORDINATES: &[(&str, &str)] = &[
    ("nyc", "40.7128,-74.0060"),
    ("manhattan", "40.7589,-73.9851"),
    ("brooklyn", "40.6782,-73.9442"),
    ("queens", "40.7282,-73.7949"),
    ("bronx", "40.8448,-73.8648"),
    ("staten island", "40.5795,-74.1502"),
];

const EVENT_PHRASES: &[&str] = &[
    r"vintage\s+markets?",
    r"antique\s+fairs?",
    r"vintage\s+festivals?",
    r"vintage\s+pop-?ups?",
    r"vintage\s+shops?",
    r"flea\s+markets?",
    r"vintage\s+events?",
    r"vintage\s+shows?",
];

// Trailing noise dropped from a prepositional location capture
const LOCATION_TAIL: &str = r"(?:\s+(?:new\s+york|nyc|ny))?(?:\s+(?:(?:this|next)\s+week(?:end)?|today|tonight|tomorrow))?[\s?.!]*$";

const LOCATION_PREPOSITIONS: &[&str] = &["in", "near", "around", "at"];

const TIME_PATTERNS: &[(&str, TimeConstraint)] = &[
    (r"\bthis\s+weekend\b", TimeConstraint::ThisWeekend),
    (r"\bnext\s+weekend\b", TimeConstraint::NextWeekend),
    (r"\bthis\s+week\b", TimeConstraint::ThisWeek),
    (r"\bnext\s+week\b", TimeConstraint::NextWeek),
    (r"\b(?:today|tonight)\b", TimeConstraint::Today),
    (r"\btomorrow\b", TimeConstraint::Tomorrow),
    (r"\bweekend\b", TimeConstraint::ThisWeekend),
];

const STARTING_POINT_PATTERNS: &[&str] = &[
    r"\bstarting\s+(?:from|at)\s+([^,\n]+)",
    r"\bi(?:'m|\s+am)\s+at\s+([^,\n]+)",
    r"\bfrom\s+([^,\n]+)",
    r"\bat\s+([^,\n]+?(?:street|avenue|road|boulevard)[^,\n]*)",
];

const TRAVEL_TIME_PATTERNS: &[&str] = &[
    r"\bwithin\s+(\d+)\s*min",
    r"\bno\s+more\s+than\s+(\d+)\s*min",
    r"\bless\s+than\s+(\d+)\s*min",
    r"\b(?:max(?:imum)?|up\s+to|under)\s+(\d+)\s*min",
    r"\b(\d+)\s*min(?:ute)?s?\s+(?:away|travel|commute|ride)",
    r"\b(\d+)\s*min",
];

const TRANSPORT_PATTERNS: &[&str] = &[
    r"\b(?:by|on|via)\s+(train|subway|bus|walking|foot|car|bike|bicycle)\b",
    r"\b(walking|driving|biking|cycling)\b",
];

const CONFLICT_PATTERNS: &[&str] = &[
    r"\bconflicts?\b",
    r"\bwhat\s+i\s+have\b",
    r"\bmy\s+events?\b",
    r"\bmy\s+calendar\b",
    r"\bcurrent\s+events?\b",
    r"\bam\s+i\s+free\b",
    r"\bthis\s+weekend\b",
];

/// One ranked extraction rule.
struct Rule<T> {
    pattern: Regex,
    extract: fn(&Captures) -> Option<T>,
}

impl<T> Rule<T> {
    fn new(pattern: &str, extract: fn(&Captures) -> Option<T>) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("invalid parser pattern"),
            extract,
        }
    }
}

/// First rule in table order that both matches and extracts a value.
fn first_match<T>(rules: &[Rule<T>], text: &str) -> Option<T> {
    rules.iter().find_map(|rule| {
        rule.pattern
            .captures(text)
            .and_then(|caps| (rule.extract)(&caps))
    })
}

fn captured_text(caps: &Captures) -> Option<String> {
    let text = caps
        .get(1)?
        .as_str()
        .trim()
        .trim_end_matches(['?', '.', '!'])
        .trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn whole_match(caps: &Captures) -> Option<String> {
    caps.get(0).map(|m| m.as_str().to_string())
}

fn captured_minutes(caps: &Captures) -> Option<u32> {
    caps.get(1)?.as_str().parse().ok()
}

fn captured_mode(caps: &Captures) -> Option<TransportMode> {
    TransportMode::from_word(caps.get(1)?.as_str())
}

pub struct QueryParser {
    default_location: String,
    event_phrases: Vec<Rule<String>>,
    locations: Vec<Rule<String>>,
    time_constraints: Vec<(Regex, TimeConstraint)>,
    starting_points: Vec<Rule<String>>,
    travel_times: Vec<Rule<u32>>,
    transport_modes: Vec<Rule<TransportMode>>,
    conflict_cues: Vec<Regex>,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new("nyc")
    }
}

impl QueryParser {
    pub fn new(default_location: &str) -> Self {
        let compile = |p: &str| Regex::new(p).expect("invalid parser pattern");

        Self {
            default_location: default_location.to_lowercase(),
            event_phrases: EVENT_PHRASES
                .iter()
                .map(|p| Rule::new(&format!(r"\b{p}\b"), whole_match))
                .collect(),
            locations: LOCATION_PREPOSITIONS
                .iter()
                .map(|prep| {
                    Rule::new(&format!(r"\b{prep}\s+([^,\n]+?){LOCATION_TAIL}"), captured_text)
                })
                .collect(),
            time_constraints: TIME_PATTERNS
                .iter()
                .map(|(p, constraint)| (compile(*p), *constraint))
                .collect(),
            starting_points: STARTING_POINT_PATTERNS
                .iter()
                .map(|p| Rule::new(p, captured_text))
                .collect(),
            travel_times: TRAVEL_TIME_PATTERNS
                .iter()
                .map(|p| Rule::new(p, captured_minutes))
                .collect(),
            transport_modes: TRANSPORT_PATTERNS
                .iter()
                .map(|p| Rule::new(p, captured_mode))
                .collect(),
            conflict_cues: CONFLICT_PATTERNS.iter().map(|p| compile(*p)).collect(),
        }
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// Never fails: unmatched fields take their default or stay absent.
    pub fn parse(&self, query: &str) -> Intent {
        let text = query.to_lowercase().replace(['\u{2018}', '\u{2019}'], "'");

        Intent {
            event_type: event_category(&text),
            event_phrase: first_match(&self.event_phrases, &text),
            location: self.location(&text),
            time_constraint: self
                .time_constraints
                .iter()
                .find(|(pattern, _)| pattern.is_match(&text))
                .map(|(_, constraint)| *constraint)
                .unwrap_or_default(),
            starting_point: first_match(&self.starting_points, &text),
            max_travel_minutes: first_match(&self.travel_times, &text),
            transport_mode: first_match(&self.transport_modes, &text).unwrap_or_default(),
            check_conflicts: self.conflict_cues.iter().any(|cue| cue.is_match(&text)),
            original_query: query.to_string(),
        }
    }

    fn location(&self, text: &str) -> String {
        if let Some(area) = NAMED_AREAS.iter().find(|area| text.contains(*area)) {
            return area.to_string();
        }
        first_match(&self.locations, text).unwrap_or_else(|| self.default_location.clone())
    }
}

/// Group order is priority order, regardless of where keywords sit in the text.
fn event_category(text: &str) -> EventCategory {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

/// "lat,lon" for a known area; anything else resolves to the city centre.
pub fn coordinates_for(location: &str) -> &'static str {
    AREA_COORDINATES
        .iter()
        .find(|(area, _)| *area == location)
        .or_else(|| AREA_COORDINATES.first())
        .map(|(_, coords)| *coords)
        .unwrap_or("40.7128,-74.0060")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(q: &str) -> Intent {
        QueryParser::default().parse(q)
    }

    #[test]
    fn test_vintage_near_brooklyn_this_weekend() {
        let intent = parse("find vintage markets near brooklyn this weekend");
        assert_eq!(intent.event_type, EventCategory::Vintage);
        assert_eq!(intent.event_phrase.as_deref(), Some("vintage markets"));
        assert_eq!(intent.location, "brooklyn");
        assert_eq!(intent.time_constraint, TimeConstraint::ThisWeekend);
    }

    #[test]
    fn test_starting_point_and_travel_time() {
        let intent = parse("I'm at 162 East 82nd Street, no more than 30 min by train");
        assert_eq!(intent.starting_point.as_deref(), Some("162 east 82nd street"));
        assert_eq!(intent.max_travel_minutes, Some(30));
        assert_eq!(intent.transport_mode, TransportMode::Transit);
    }

    #[test]
    fn test_default_location_without_cue() {
        let intent = parse("show me some concerts");
        assert_eq!(intent.location, "nyc");

        let parser = QueryParser::new("Chicago");
        assert_eq!(parser.parse("any yoga classes?").location, "chicago");
    }

    #[test]
    fn test_category_priority_is_table_order() {
        // "concert" (music) appears before "vintage" in the text, vintage still wins
        let intent = parse("concert then a vintage fair");
        assert_eq!(intent.event_type, EventCategory::Vintage);

        // festival belongs to food and culture; food is ranked first
        assert_eq!(parse("heritage festival").event_type, EventCategory::Food);
        // performance belongs to art and music; art is ranked first
        assert_eq!(parse("a performance").event_type, EventCategory::Art);
    }

    #[test]
    fn test_default_category() {
        let intent = parse("what is happening in soho");
        assert_eq!(intent.event_type, EventCategory::Events);
        assert_eq!(intent.event_phrase, None);
    }

    #[test]
    fn test_prepositional_location() {
        assert_eq!(parse("yoga classes in soho").location, "soho");
        assert_eq!(
            parse("gallery openings around the lower east side?").location,
            "the lower east side"
        );
        assert_eq!(parse("museums in hoboken this weekend").location, "hoboken");
        assert_eq!(parse("food trucks near jersey city ny").location, "jersey city");
    }

    #[test]
    fn test_named_area_beats_preposition() {
        assert_eq!(parse("art in soho or queens").location, "queens");
        assert_eq!(parse("are there any vintage events in new york").location, "new york");
    }

    #[test]
    fn test_time_constraints() {
        assert_eq!(parse("gym sessions today").time_constraint, TimeConstraint::Today);
        assert_eq!(parse("dinner tonight").time_constraint, TimeConstraint::Today);
        assert_eq!(parse("jazz tomorrow").time_constraint, TimeConstraint::Tomorrow);
        assert_eq!(parse("markets this week").time_constraint, TimeConstraint::ThisWeek);
        assert_eq!(parse("markets next week").time_constraint, TimeConstraint::NextWeek);
        assert_eq!(parse("markets next weekend").time_constraint, TimeConstraint::NextWeekend);
        assert_eq!(parse("any markets on the weekend").time_constraint, TimeConstraint::ThisWeekend);
        assert_eq!(parse("markets").time_constraint, TimeConstraint::Unspecified);
    }

    #[test]
    fn test_starting_point_priority() {
        let intent = parse("starting from union square, art shows from 5pm");
        assert_eq!(intent.starting_point.as_deref(), Some("union square"));

        let intent = parse("flea markets from grand central");
        assert_eq!(intent.starting_point.as_deref(), Some("grand central"));

        let intent = parse("concerts, meet at 5 west 20th street please");
        assert_eq!(intent.starting_point.as_deref(), Some("5 west 20th street please"));

        assert_eq!(parse("concerts in queens").starting_point, None);
    }

    #[test]
    fn test_curly_apostrophe() {
        let intent = parse("I\u{2019}m at 10 Main Street, find music");
        assert_eq!(intent.starting_point.as_deref(), Some("10 main street"));
    }

    #[test]
    fn test_travel_time_variants() {
        assert_eq!(parse("within 40 mins of me").max_travel_minutes, Some(40));
        assert_eq!(parse("less than 15 minutes away").max_travel_minutes, Some(15));
        assert_eq!(parse("up to 25 min by bus").max_travel_minutes, Some(25));
        assert_eq!(parse("something 20 minutes away").max_travel_minutes, Some(20));
        assert_eq!(parse("a 45 min ride").max_travel_minutes, Some(45));
        assert_eq!(parse("no time limit").max_travel_minutes, None);
    }

    #[test]
    fn test_oversized_minutes_fall_through() {
        assert_eq!(parse("within 99999999999 minutes").max_travel_minutes, None);
    }

    #[test]
    fn test_transport_modes() {
        assert_eq!(parse("by subway").transport_mode, TransportMode::Transit);
        assert_eq!(parse("via bus").transport_mode, TransportMode::Transit);
        assert_eq!(parse("on foot").transport_mode, TransportMode::Walking);
        assert_eq!(parse("by bike").transport_mode, TransportMode::Bicycling);
        assert_eq!(parse("by car").transport_mode, TransportMode::Driving);
        assert_eq!(parse("walking distance only").transport_mode, TransportMode::Walking);
        assert_eq!(parse("nothing here").transport_mode, TransportMode::Transit);
    }

    #[test]
    fn test_conflict_cues() {
        assert!(parse("anything that conflicts with my calendar").check_conflicts);
        assert!(parse("check what I have saturday").check_conflicts);
        assert!(parse("markets this weekend").check_conflicts);
        assert!(!parse("markets next week").check_conflicts);
    }

    #[test]
    fn test_original_query_preserved() {
        let q = "Vintage Markets in Brooklyn";
        assert_eq!(parse(q).original_query, q);
    }

    #[test]
    fn test_coordinates_lookup() {
        assert_eq!(coordinates_for("brooklyn"), "40.6782,-73.9442");
        assert_eq!(coordinates_for("soho"), "40.7128,-74.0060");
    }
}
