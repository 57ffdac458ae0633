use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};

use crate::spec::{EnumScanDepthLimitMode, EnumScanPatternMode, ScanFilesError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeScanPatternSeq {
    Literal(Vec<String>, bool),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypeScanPatternSeq {
    fn is_matching(&self, value: &str) -> bool {
        match self {
            Self::Literal(v, if_case_insensitive) => {
                if *if_case_insensitive {
                    let value_lower = value.to_ascii_lowercase();
                    v.iter()
                        .any(|p| value_lower.contains(&p.to_ascii_lowercase()))
                } else {
                    v.iter().any(|p| value.contains(p.as_str()))
                }
            }
            Self::Glob(v) => v.iter().any(|p| p.is_match(value)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(value)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpecScanPatterns {
    pub(crate) patterns_include_files: Option<TypeScanPatternSeq>,
    pub(crate) patterns_exclude_files: Option<TypeScanPatternSeq>,
    pub(crate) patterns_exclude_dirs: Option<TypeScanPatternSeq>,
}

impl SpecScanPatterns {
    pub(crate) fn from_raw(
        patterns_include_files: Option<&[String]>,
        patterns_exclude_files: Option<&[String]>,
        patterns_exclude_dirs: Option<&[String]>,
        rule_pattern: EnumScanPatternMode,
        if_case_insensitive: bool,
    ) -> Result<Self, ScanFilesError> {
        Ok(Self {
            patterns_include_files: _compile(
                patterns_include_files,
                rule_pattern,
                if_case_insensitive,
            )?,
            patterns_exclude_files: _compile(
                patterns_exclude_files,
                rule_pattern,
                if_case_insensitive,
            )?,
            patterns_exclude_dirs: _compile(
                patterns_exclude_dirs,
                rule_pattern,
                if_case_insensitive,
            )?,
        })
    }

    pub(crate) fn should_keep_file(&self, name_file: &str) -> bool {
        !should_exclude_by_patterns(
            name_file,
            self.patterns_include_files.as_ref(),
            self.patterns_exclude_files.as_ref(),
        )
    }

    pub(crate) fn should_skip_dir(&self, name_dir: &str) -> bool {
        should_exclude_by_patterns(name_dir, None, self.patterns_exclude_dirs.as_ref())
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumScanPatternMode,
    if_case_insensitive: bool,
) -> Result<Option<TypeScanPatternSeq>, ScanFilesError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumScanPatternMode::Literal => Ok(Some(TypeScanPatternSeq::Literal(
            patterns.to_vec(),
            if_case_insensitive,
        ))),
        EnumScanPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = GlobBuilder::new(pattern)
                    .case_insensitive(if_case_insensitive)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| {
                        ScanFilesError::InvalidPattern(format!(
                            "Invalid pattern in include/exclude: {e}"
                        ))
                    })?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypeScanPatternSeq::Glob(l_glob)))
        }
        EnumScanPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(if_case_insensitive)
                    .build()
                    .map_err(|e| {
                        ScanFilesError::InvalidPattern(format!(
                            "Invalid pattern in include/exclude: {e}"
                        ))
                    })?;
                l_regex.push(regex);
            }
            Ok(Some(TypeScanPatternSeq::Regex(l_regex)))
        }
    }
}

pub(crate) fn should_exclude_by_patterns(
    value: &str,
    patterns_include: Option<&TypeScanPatternSeq>,
    patterns_exclude: Option<&TypeScanPatternSeq>,
) -> bool {
    let if_included = patterns_include.is_none_or(|p| p.is_matching(value));
    let if_excluded = patterns_exclude.is_some_and(|p| p.is_matching(value));
    !if_included || if_excluded
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DepthUtilities

pub(crate) fn validate_depth_limit(
    depth_limit: Option<usize>,
    rule_depth_limit: EnumScanDepthLimitMode,
) -> Result<(), ScanFilesError> {
    if depth_limit == Some(0) {
        return Err(ScanFilesError::InvalidDepthLimit(
            "Arg `depth_limit` must be >= 1 or None.".to_string(),
        ));
    }
    if depth_limit.is_none() && rule_depth_limit == EnumScanDepthLimitMode::Exact {
        return Err(ScanFilesError::InvalidDepthLimit(
            "`depth_limit` is required when depth_mode='exact'.".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn is_depth_within_limit(
    depth_value: usize,
    depth_limit: Option<usize>,
    rule_depth_limit: EnumScanDepthLimitMode,
) -> bool {
    match depth_limit {
        None => true,
        Some(limit) => match rule_depth_limit {
            EnumScanDepthLimitMode::AtMost => depth_value <= limit,
            EnumScanDepthLimitMode::Exact => depth_value == limit,
        },
    }
}

/// Whether directories at `depth_value` may still hold files inside the limit.
pub(crate) fn should_descend(depth_value: usize, depth_limit: Option<usize>) -> bool {
    depth_limit.is_none_or(|limit| depth_value < limit)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_glob(patterns: &[&str], if_case_insensitive: bool) -> TypeScanPatternSeq {
        let l_patterns: Vec<String> = patterns.iter().map(ToString::to_string).collect();
        _compile(
            Some(&l_patterns),
            EnumScanPatternMode::Glob,
            if_case_insensitive,
        )
        .expect("compile")
        .expect("non-empty")
    }

    #[test]
    fn test_glob_matches_report_basename() {
        let pats = compile_glob(&["SDR_676_*.xls"], false);
        assert!(pats.is_matching("SDR_676_202509.xls"));
        assert!(!pats.is_matching("SDR_676_202509.xlsx"));
        assert!(!pats.is_matching("SDR_677_202509.xls"));
        assert!(!pats.is_matching("sdr_676_202509.XLS"));
    }

    #[test]
    fn test_glob_case_insensitive() {
        let pats = compile_glob(&["SDR_676_*.xls"], true);
        assert!(pats.is_matching("sdr_676_202509.XLS"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let include = compile_glob(&["*.xls"], false);
        let exclude = compile_glob(&["~$*"], false);
        assert!(!should_exclude_by_patterns("a.xls", Some(&include), Some(&exclude)));
        assert!(should_exclude_by_patterns("~$a.xls", Some(&include), Some(&exclude)));
        assert!(should_exclude_by_patterns("a.csv", Some(&include), Some(&exclude)));
        assert!(!should_exclude_by_patterns("a.csv", None, None));
    }

    #[test]
    fn test_empty_pattern_list_is_none() {
        let res = _compile(Some(&[]), EnumScanPatternMode::Regex, false).expect("compile");
        assert!(res.is_none());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let res = _compile(
            Some(&["(".to_string()]),
            EnumScanPatternMode::Regex,
            false,
        );
        assert!(matches!(res, Err(ScanFilesError::InvalidPattern(_))));
    }

    #[test]
    fn test_literal_is_substring() {
        let pats = TypeScanPatternSeq::Literal(vec!["676".to_string()], false);
        assert!(pats.is_matching("SDR_676_01.xls"));
        assert!(!pats.is_matching("SDR_677_01.xls"));
    }

    #[test]
    fn test_depth_rules() {
        assert!(validate_depth_limit(Some(0), EnumScanDepthLimitMode::AtMost).is_err());
        assert!(validate_depth_limit(None, EnumScanDepthLimitMode::Exact).is_err());
        assert!(validate_depth_limit(None, EnumScanDepthLimitMode::AtMost).is_ok());

        assert!(is_depth_within_limit(1, Some(1), EnumScanDepthLimitMode::AtMost));
        assert!(!is_depth_within_limit(2, Some(1), EnumScanDepthLimitMode::AtMost));
        assert!(!is_depth_within_limit(1, Some(2), EnumScanDepthLimitMode::Exact));
        assert!(should_descend(0, Some(1)));
        assert!(!should_descend(1, Some(1)));
        assert!(should_descend(7, None));
    }
}
