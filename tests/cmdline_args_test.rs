//! Tests for command-line argument parsing
//!
//! Note: These tests verify the argument parser configuration by creating
//! a test parser with the same structure as the batch binary.

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};
use hand_motion_analysis::{
    keypoints::KeypointId,
    pipeline::AnalysisRequest,
    signal::AnalysisMethod,
    time_range::TimeRange,
    Error,
};

/// Create a command with the same argument structure as the batch binary
fn create_test_command() -> ClapCommand {
    ClapCommand::new("hand-motion")
        .version("0.1.0")
        .about("Hand motion analysis from keypoint coordinates")
        .arg(
            Arg::new("movie")
                .long("movie")
                .value_name("NAME")
                .required(true)
                .help("Movie name, without extension"),
        )
        .arg(
            Arg::new("range")
                .long("range")
                .num_args(1..)
                .required(true)
                .help("Range of the movie"),
        )
        .arg(
            Arg::new("method")
                .long("method")
                .required(true)
                .value_parser(["track", "distance", "angle"])
                .help("Method of analysis"),
        )
        .arg(
            Arg::new("keypoints")
                .long("keypoints")
                .num_args(1..)
                .required(true)
                .value_parser(value_parser!(usize))
                .help("Keypoint indices"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("PATH")
                .help("Coordinate directory"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("PATH")
                .help("Output directory"),
        )
        .arg(
            Arg::new("config")
                .short('C')
                .long("config")
                .value_name("PATH")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debug output"),
        )
}

/// Build the request the binary would build from parsed arguments
fn request_from(args: &[&str]) -> hand_motion_analysis::Result<AnalysisRequest> {
    let matches = create_test_command()
        .try_get_matches_from(args.iter().copied())
        .map_err(|e| Error::InvalidInput(e.to_string()))?;

    let range: Vec<&String> = matches.get_many::<String>("range").unwrap_or_default().collect();
    if range.len() != 2 {
        return Err(Error::InvalidInput("The number of --range should be 2".to_string()));
    }
    let keypoints = matches
        .get_many::<usize>("keypoints")
        .unwrap_or_default()
        .map(|&index| KeypointId::new(index))
        .collect::<hand_motion_analysis::Result<Vec<_>>>()?;

    let request = AnalysisRequest::new(
        matches.get_one::<String>("movie").cloned().unwrap_or_default(),
        TimeRange::parse(range[0], range[1])?,
        matches.get_one::<String>("method").map_or("", String::as_str).parse::<AnalysisMethod>()?,
        keypoints,
    );
    request.validate()?;
    Ok(request)
}

#[test]
fn test_help_argument() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["hand-motion", "--help"]);

    // Help should cause an error (but a specific help error)
    assert!(result.is_err());
    let err = result.unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
}

#[test]
fn test_required_arguments() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["hand-motion", "--movie", "sync_1"]);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_full_invocation() {
    let request = request_from(&[
        "hand-motion",
        "--movie",
        "sync_1",
        "--range",
        "1m25s",
        "1m35s",
        "--method",
        "angle",
        "--keypoints",
        "2",
        "3",
        "4",
    ])
    .unwrap();

    assert_eq!(request.clip_id, "sync_1");
    assert_eq!(request.range.to_string(), "1m25s-1m35s");
    assert_eq!(request.method, AnalysisMethod::Angle);
    assert_eq!(
        request.keypoints,
        vec![KeypointId::THUMB_MCP, KeypointId::THUMB_IP, KeypointId::THUMB_TIP]
    );
}

#[test]
fn test_method_values() {
    for method in ["track", "distance", "angle"] {
        let cmd = create_test_command();
        let result = cmd.try_get_matches_from(vec![
            "hand-motion",
            "--movie",
            "m",
            "--range",
            "0m0s",
            "0m1s",
            "--method",
            method,
            "--keypoints",
            "0",
        ]);

        assert!(result.is_ok(), "Should accept method: {}", method);
        let matches = result.unwrap();
        assert_eq!(matches.get_one::<String>("method").map(|s| s.as_str()), Some(method));
    }

    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec![
        "hand-motion", "--movie", "m", "--range", "0m0s", "0m1s", "--method", "speed", "--keypoints", "0",
    ]);
    assert_eq!(result.unwrap_err().kind(), clap::error::ErrorKind::InvalidValue);
}

#[test]
fn test_range_needs_two_values() {
    let result = request_from(&[
        "hand-motion", "--movie", "m", "--range", "0m0s", "--method", "track", "--keypoints", "0",
    ]);
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let result = request_from(&[
        "hand-motion", "--movie", "m", "--range", "0m0s", "0m1s", "0m2s", "--method", "track", "--keypoints", "0",
    ]);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_reversed_range_is_rejected() {
    let result = request_from(&[
        "hand-motion", "--movie", "m", "--range", "1m0s", "0m10s", "--method", "track", "--keypoints", "0",
    ]);
    assert!(matches!(result, Err(Error::InvalidRange { .. })));
}

#[test]
fn test_keypoint_count_must_match_method() {
    let result = request_from(&[
        "hand-motion", "--movie", "m", "--range", "0m0s", "0m1s", "--method", "distance", "--keypoints", "4",
    ]);
    assert!(matches!(
        result,
        Err(Error::KeypointCountMismatch {
            expected: 2,
            actual: 1,
            ..
        })
    ));
}

#[test]
fn test_keypoint_out_of_registry() {
    let result = request_from(&[
        "hand-motion", "--movie", "m", "--range", "0m0s", "0m1s", "--method", "track", "--keypoints", "21",
    ]);
    assert!(matches!(result, Err(Error::UnknownKeypoint(_))));

    // Negative indices are rejected by the parser itself
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec![
        "hand-motion", "--movie", "m", "--range", "0m0s", "0m1s", "--method", "track", "--keypoints", "-1",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_optional_directories_and_debug() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec![
            "hand-motion",
            "--movie",
            "m",
            "--range",
            "0m0s",
            "0m1s",
            "--method",
            "track",
            "--keypoints",
            "0",
            "--data-dir",
            "coords",
            "-o",
            "plots",
            "-C",
            "config.yaml",
            "-d",
        ])
        .unwrap();

    assert_eq!(matches.get_one::<String>("data-dir").map(|s| s.as_str()), Some("coords"));
    assert_eq!(matches.get_one::<String>("output-dir").map(|s| s.as_str()), Some("plots"));
    assert_eq!(matches.get_one::<String>("config").map(|s| s.as_str()), Some("config.yaml"));
    assert!(matches.get_flag("debug"));
}
