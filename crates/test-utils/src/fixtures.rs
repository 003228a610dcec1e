//! Common NWM naming fixtures.

use chrono::NaiveDate;

/// Well-known file names covering each naming shape.
pub mod names {
    /// Deterministic short range channel output
    pub const SHORT_RANGE_CHANNEL: &str = "nwm.t06z.short_range.channel_rt.f005.conus.nc";

    /// Ensemble member 3 of the medium range channel output
    pub const MEDIUM_RANGE_MEMBER: &str = "nwm.t00z.medium_range.channel_rt_3.f012.conus.nc";

    /// Analysis output, where the step token is `tm02`
    pub const ANALYSIS: &str = "nwm.t18z.analysis_assim.land.tm02.hawaii.nc";

    /// Fewer than six dot-separated segments
    pub const TOO_SHORT: &str = "nwm.t06z.short_range.nc";

    /// Reference hour that is not a number
    pub const BAD_REFERENCE: &str = "nwm.tXXz.short_range.channel_rt.f001.conus.nc";
}

/// The date most fixtures are built around.
pub fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 8, 21).unwrap_or_default()
}

/// Name of the directory holding one day of output, e.g. `nwm.20200821`.
pub fn day_name(date: NaiveDate) -> String {
    format!("nwm.{}", date.format("%Y%m%d"))
}

/// Name of a configuration directory, e.g. `short_range` or `medium_range_mem3`.
pub fn configuration_dir(configuration_type: &str, member: Option<u64>) -> String {
    match member {
        Some(member) => format!("{}_mem{}", configuration_type, member),
        None => configuration_type.to_string(),
    }
}

/// Build an NWM file name.
///
/// ```
/// use test_utils::file_name;
///
/// assert_eq!(
///     file_name(6, "short_range", "channel_rt", None, 5, "conus"),
///     "nwm.t06z.short_range.channel_rt.f005.conus.nc"
/// );
/// assert_eq!(
///     file_name(0, "medium_range", "land", Some(2), 12, "conus"),
///     "nwm.t00z.medium_range.land_2.f012.conus.nc"
/// );
/// ```
pub fn file_name(
    reference: u32,
    configuration_type: &str,
    model_type: &str,
    member: Option<u64>,
    step: u64,
    area: &str,
) -> String {
    let model = match member {
        Some(member) => format!("{}_{}", model_type, member),
        None => model_type.to_string(),
    };
    format!(
        "nwm.t{:02}z.{}.{}.f{:03}.{}.nc",
        reference, configuration_type, model, step, area
    )
}

/// Render an Apache-style directory index linking to each entry.
///
/// Includes the sort links and "Parent Directory" link real listings carry.
pub fn nomads_index(title: &str, entries: &[&str]) -> String {
    let mut html = format!(
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\n<html>\n <head>\n  <title>Index of {title}</title>\n </head>\n <body>\n<h1>Index of {title}</h1>\n<pre><a href=\"?C=N;O=D\">Name</a>                    <a href=\"?C=M;O=A\">Last modified</a>      <a href=\"?C=S;O=A\">Size</a>\n<hr><a href=\"/pub/data/nccf/com/nwm/\">Parent Directory</a>                             -   \n"
    );

    for entry in entries {
        html.push_str(&format!(
            "<a href=\"{entry}\">{entry}</a>                  21-Aug-2020 06:55    -   \n"
        ));
    }

    html.push_str("<hr></pre>\n</body></html>\n");
    html
}
