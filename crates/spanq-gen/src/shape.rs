//! Shape descriptors: what the synthesizer needs to know about a receiver.

use serde::Serialize;
use spanq_common::ty::{self, Ty};

/// The synthesis-relevant profile of a receiver type.
///
/// The builtin views are described by [`Shape::span`] and
/// [`Shape::read_only_span`]; every other shape is derived from a
/// synthesis request (see `SynthesisRequest::result_shape`). A shape
/// without a known length never offers indexed access or slicing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Shape {
    /// Type name; also the stem of names derived from this shape.
    pub name: String,
    /// The mutable borrowed view.
    pub is_span: bool,
    /// The read-only borrowed view.
    pub is_read_only_span: bool,
    /// O(1) `Length()` is available.
    pub has_length: bool,
    /// Generic parameters, element type last.
    pub type_params: Vec<String>,
}

impl Shape {
    pub fn span() -> Shape {
        Shape {
            name: ty::SPAN.to_string(),
            is_span: true,
            is_read_only_span: false,
            has_length: true,
            type_params: vec!["T".to_string()],
        }
    }

    pub fn read_only_span() -> Shape {
        Shape {
            name: ty::READ_ONLY_SPAN.to_string(),
            is_span: false,
            is_read_only_span: true,
            has_length: true,
            type_params: vec!["T".to_string()],
        }
    }

    pub fn is_view(&self) -> bool {
        self.is_span || self.is_read_only_span
    }

    /// The element type parameter.
    pub fn element_param(&self) -> &str {
        self.type_params.last().map(String::as_str).unwrap_or("T")
    }

    /// The shape's type applied to `params`.
    pub fn ty_with(&self, params: &[String]) -> Ty {
        Ty::app(self.name.clone(), params.iter().map(Ty::param).collect())
    }

    /// The shape's type over its own parameters.
    pub fn ty(&self) -> Ty {
        self.ty_with(&self.type_params)
    }

    /// Name of the enumerator type driving `for` loops over this shape.
    pub fn enumerator_name(&self) -> String {
        if self.is_span {
            ty::SPAN_ENUMERATOR.to_string()
        } else if self.is_read_only_span {
            ty::READ_ONLY_SPAN_ENUMERATOR.to_string()
        } else {
            enumerator_name(&self.name)
        }
    }

    /// The enumerator type applied to `params`.
    pub fn enumerator_ty_with(&self, params: &[String]) -> Ty {
        Ty::app(self.enumerator_name(), params.iter().map(Ty::param).collect())
    }
}

/// `WhereSpan` -> `WhereSpanEnumerator`.
pub fn enumerator_name(wrapper: &str) -> String {
    format!("{wrapper}Enumerator")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_views() {
        let span = Shape::span();
        let ros = Shape::read_only_span();
        assert!(span.is_view() && ros.is_view());
        assert!(span.is_span && !span.is_read_only_span);
        assert!(ros.is_read_only_span && !ros.is_span);
        assert!(span.has_length && ros.has_length);
        assert_eq!(ros.element_param(), "T");
        assert_eq!(ros.ty().to_string(), "ReadOnlySpan<T>");
    }

    #[test]
    fn enumerator_names() {
        assert_eq!(Shape::span().enumerator_name(), "SpanEnumerator");
        assert_eq!(
            Shape::read_only_span().enumerator_name(),
            "ReadOnlySpanEnumerator"
        );
        let wrapper = Shape {
            name: "SelectSpan".into(),
            is_span: false,
            is_read_only_span: false,
            has_length: true,
            type_params: vec!["TSource".into(), "TResult".into()],
        };
        assert_eq!(
            wrapper.enumerator_ty_with(&wrapper.type_params).to_string(),
            "SelectSpanEnumerator<TSource, TResult>"
        );
        assert_eq!(wrapper.element_param(), "TResult");
    }
}
