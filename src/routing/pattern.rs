//! Pattern classification and compilation.
//!
//! # Responsibilities
//! - Normalize pattern and request paths (strip one leading/trailing `/`)
//! - Classify a registration pattern as exact, parameterized, or wildcard
//! - Compile parameterized patterns into prefix + fixed/dynamic segments
//!
//! # Pattern syntax
//! - Literal segment: matched verbatim
//! - `:name:type` segment: dynamic; `type` selects a registered transformer
//! - Trailing `/*`: wildcard; the suffix is exposed as the `wildcard` param
//!
//! A pattern may not combine dynamic segments with a trailing wildcard;
//! that is a registration-time error.

use thiserror::Error;

/// Errors raised at route registration time. These are fatal to the
/// registration; there is no partial-registration recovery.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Pattern contains both `:name:type` segments and a trailing `/*`.
    #[error("wildcard pattern `{0}` cannot contain dynamic segments")]
    WildcardWithDynamic(String),
}

/// Strip a single leading and a single trailing `/`.
///
/// Registration patterns and request paths go through the same
/// normalization so `/users/`, `/users` and `users` all agree.
pub(crate) fn normalize(path: &str) -> &str {
    let p = path.strip_prefix('/').unwrap_or(path);
    p.strip_suffix('/').unwrap_or(p)
}

/// Number of `/`-separated segments in a normalized path.
pub(crate) fn segment_count(path: &str) -> usize {
    path.split('/').count()
}

/// A fixed segment of a parameterized pattern: must equal `literal` at
/// position `index` for the pattern to match.
#[derive(Debug, Clone)]
pub(crate) struct FixedSegment {
    pub index: usize,
    pub literal: String,
}

/// A dynamic segment of a parameterized pattern.
#[derive(Debug, Clone)]
pub(crate) struct DynSegment {
    pub index: usize,
    pub name: String,
    /// Transformer type tag from `:name:type`.
    pub type_tag: String,
}

/// A registration pattern compiled into its matching strategy.
#[derive(Debug, Clone)]
pub(crate) enum CompiledPattern {
    /// Whole normalized path, matched verbatim.
    Exact(String),
    /// Segment-wise match with dynamic parameters.
    Parameterized(ParamPattern),
    /// Literal prefix match; everything past it is the wildcard remainder.
    Wildcard(WildcardPattern),
}

#[derive(Debug, Clone)]
pub(crate) struct ParamPattern {
    /// Literal run of fixed leading segments, each followed by `/`.
    /// Empty when the first segment is dynamic; accumulation stops at the
    /// first dynamic segment even if later segments are fixed.
    pub prefix: String,
    pub seg_count: usize,
    pub fixed: Vec<FixedSegment>,
    pub dynamic: Vec<DynSegment>,
}

#[derive(Debug, Clone)]
pub(crate) struct WildcardPattern {
    /// Normalized pattern up to (not including) the trailing `/*`.
    pub prefix: String,
}

/// Split a segment of the form `:name:type` into its parts.
///
/// Only the two-colon form is dynamic; a bare `:name` is a literal segment.
fn dynamic_parts(segment: &str) -> Option<(&str, &str)> {
    let rest = segment.strip_prefix(':')?;
    rest.split_once(':')
}

/// Classify and compile a registration pattern.
pub(crate) fn compile(pattern: &str) -> Result<CompiledPattern, RouterError> {
    let is_dynamic = pattern.contains(':');
    let is_wildcard = pattern.ends_with("/*");

    if is_dynamic && is_wildcard {
        return Err(RouterError::WildcardWithDynamic(pattern.to_string()));
    }

    if is_wildcard {
        let trimmed = &pattern[..pattern.len() - 1]; // drop the `*`
        return Ok(CompiledPattern::Wildcard(WildcardPattern {
            prefix: normalize(trimmed).to_string(),
        }));
    }

    let path = normalize(pattern);

    if !is_dynamic {
        return Ok(CompiledPattern::Exact(path.to_string()));
    }

    let mut fixed = Vec::new();
    let mut dynamic = Vec::new();
    let mut prefix = String::new();
    let mut prefix_complete = false;

    for (index, segment) in path.split('/').enumerate() {
        if let Some((name, type_tag)) = dynamic_parts(segment) {
            prefix_complete = true;
            dynamic.push(DynSegment {
                index,
                name: name.to_string(),
                type_tag: type_tag.to_string(),
            });
        } else {
            if !prefix_complete {
                prefix.push_str(segment);
                prefix.push('/');
            }
            fixed.push(FixedSegment {
                index,
                literal: segment.to_string(),
            });
        }
    }

    Ok(CompiledPattern::Parameterized(ParamPattern {
        prefix,
        seg_count: segment_count(path),
        fixed,
        dynamic,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_one_slash_each_side() {
        assert_eq!(normalize("/users/"), "users");
        assert_eq!(normalize("/users"), "users");
        assert_eq!(normalize("users"), "users");
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize("/a/b/c/"), "a/b/c");
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count(""), 1);
        assert_eq!(segment_count("users"), 1);
        assert_eq!(segment_count("api/v1/users"), 3);
    }

    #[test]
    fn test_compile_exact() {
        match compile("/api/status/").unwrap() {
            CompiledPattern::Exact(path) => assert_eq!(path, "api/status"),
            other => panic!("expected exact, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_wildcard() {
        match compile("static/*").unwrap() {
            CompiledPattern::Wildcard(w) => assert_eq!(w.prefix, "static"),
            other => panic!("expected wildcard, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_parameterized_prefix_and_segments() {
        let compiled = compile("api/v1/nodes/:tree_id:int/:parent_id:int").unwrap();
        let p = match compiled {
            CompiledPattern::Parameterized(p) => p,
            other => panic!("expected parameterized, got {:?}", other),
        };
        assert_eq!(p.prefix, "api/v1/nodes/");
        assert_eq!(p.seg_count, 5);
        assert_eq!(p.fixed.len(), 3);
        assert_eq!(p.dynamic.len(), 2);
        assert_eq!(p.dynamic[0].name, "tree_id");
        assert_eq!(p.dynamic[0].type_tag, "int");
        assert_eq!(p.dynamic[0].index, 3);
        assert_eq!(p.dynamic[1].index, 4);
    }

    #[test]
    fn test_prefix_stops_at_first_dynamic_segment() {
        // The fixed segment after the dynamic one is a constraint, not
        // part of the prefix.
        let compiled = compile("users/:id:int/profile").unwrap();
        let p = match compiled {
            CompiledPattern::Parameterized(p) => p,
            other => panic!("expected parameterized, got {:?}", other),
        };
        assert_eq!(p.prefix, "users/");
        let literals: Vec<_> = p.fixed.iter().map(|f| f.literal.as_str()).collect();
        assert_eq!(literals, vec!["users", "profile"]);
        assert_eq!(p.fixed[1].index, 2);
    }

    #[test]
    fn test_leading_dynamic_segment_has_empty_prefix() {
        let compiled = compile(":resource:str/list").unwrap();
        let p = match compiled {
            CompiledPattern::Parameterized(p) => p,
            other => panic!("expected parameterized, got {:?}", other),
        };
        assert_eq!(p.prefix, "");
        assert_eq!(p.dynamic[0].index, 0);
    }

    #[test]
    fn test_bare_colon_segment_is_literal() {
        // Only `:name:type` is dynamic; `:name` matches itself verbatim.
        let compiled = compile("files/:latest").unwrap();
        let p = match compiled {
            CompiledPattern::Parameterized(p) => p,
            other => panic!("expected parameterized, got {:?}", other),
        };
        assert!(p.dynamic.is_empty());
        assert_eq!(p.fixed[1].literal, ":latest");
    }

    #[test]
    fn test_wildcard_with_dynamic_is_rejected() {
        let err = compile("api/:id:int/*").unwrap_err();
        assert!(matches!(err, RouterError::WildcardWithDynamic(_)));
    }
}
