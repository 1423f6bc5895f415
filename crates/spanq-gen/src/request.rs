//! Synthesis requests: one `(receiver shape, operator)` unit of work.

use std::cell::OnceCell;

use spanq_common::ty::Ty;

use crate::method::Method;
use crate::shape::Shape;

/// A `(receiver shape, operator)` pair with lazily derived, memoized
/// result shape and source-side generic parameters.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    receiver: Shape,
    method: Method,
    result: OnceCell<Option<Shape>>,
    source_params: OnceCell<Vec<String>>,
}

impl SynthesisRequest {
    pub fn new(receiver: Shape, method: Method) -> Self {
        Self {
            receiver,
            method,
            result: OnceCell::new(),
            source_params: OnceCell::new(),
        }
    }

    pub fn receiver(&self) -> &Shape {
        &self.receiver
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Memoization key; at most one request per key emits declarations.
    pub fn key(&self) -> (String, Method) {
        (self.receiver.name.clone(), self.method)
    }

    /// Generic parameters of the source side of the generated method.
    ///
    /// Select renames them: a single parameter becomes `TSource`, several
    /// get the receiver name as prefix, so nesting Select in Select never
    /// collides with the appended `TResult`.
    pub fn source_type_params(&self) -> &[String] {
        self.source_params.get_or_init(|| {
            let params = &self.receiver.type_params;
            match self.method {
                Method::Select if params.len() == 1 => vec!["TSource".to_string()],
                Method::Select => params
                    .iter()
                    .map(|p| format!("{}{}", self.receiver.name, p))
                    .collect(),
                _ => params.clone(),
            }
        })
    }

    /// Shape of the produced sequence; `None` for terminal operators.
    pub fn result_shape(&self) -> Option<&Shape> {
        self.result.get_or_init(|| self.derive_result()).as_ref()
    }

    fn derive_result(&self) -> Option<Shape> {
        let method = self.method;
        if !method.produces_sequence() {
            return None;
        }
        let recv = &self.receiver;
        let has_length = recv.has_length && method != Method::Where;
        let name = if method.is_slice() && has_length {
            recv.name.clone()
        } else if recv.is_read_only_span {
            format!("{}Span", method.name())
        } else {
            format!("{}{}", method.name(), recv.name)
        };
        let mut type_params = self.source_type_params().to_vec();
        if method == Method::Select {
            type_params.push("TResult".to_string());
        }
        Some(Shape {
            name,
            is_span: recv.is_span && method.is_slice(),
            is_read_only_span: recv.is_read_only_span && method.is_slice(),
            has_length,
            type_params,
        })
    }

    /// The receiver type over the source parameters.
    pub fn source_ty(&self) -> Ty {
        self.receiver.ty_with(self.source_type_params())
    }

    /// The element type of the receiver over the source parameters.
    pub fn element_ty(&self) -> Ty {
        match self.source_type_params().last() {
            Some(p) => Ty::param(p.clone()),
            None => Ty::param(self.receiver.element_param()),
        }
    }

    /// The receiver's enumerator type over the source parameters.
    pub fn source_enumerator_ty(&self) -> Ty {
        self.receiver.enumerator_ty_with(self.source_type_params())
    }

    pub fn result_ty(&self) -> Option<Ty> {
        self.result_shape().map(Shape::ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper(name: &str, params: &[&str], has_length: bool) -> Shape {
        Shape {
            name: name.into(),
            is_span: false,
            is_read_only_span: false,
            has_length,
            type_params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn select_over_read_only_span() {
        let req = SynthesisRequest::new(Shape::read_only_span(), Method::Select);
        assert_eq!(req.source_type_params(), &["TSource".to_string()]);
        let result = req.result_shape().unwrap();
        assert_eq!(result.name, "SelectSpan");
        assert!(result.has_length);
        assert!(!result.is_view());
        assert_eq!(result.type_params, vec!["TSource", "TResult"]);
        assert_eq!(req.source_ty().to_string(), "ReadOnlySpan<TSource>");
    }

    #[test]
    fn select_over_span_shares_the_read_only_name() {
        let req = SynthesisRequest::new(Shape::span(), Method::Select);
        assert_eq!(req.result_shape().unwrap().name, "SelectSpan");
    }

    #[test]
    fn nested_select_prefixes_parameters() {
        let inner = wrapper("SelectSpan", &["TSource", "TResult"], true);
        let req = SynthesisRequest::new(inner, Method::Select);
        assert_eq!(
            req.source_type_params(),
            &["SelectSpanTSource".to_string(), "SelectSpanTResult".to_string()]
        );
        let result = req.result_shape().unwrap();
        assert_eq!(result.name, "SelectSelectSpan");
        assert_eq!(
            result.ty().to_string(),
            "SelectSelectSpan<SelectSpanTSource, SelectSpanTResult, TResult>"
        );
        assert_eq!(req.element_ty(), Ty::param("SelectSpanTResult"));
    }

    #[test]
    fn where_drops_length() {
        let req = SynthesisRequest::new(Shape::read_only_span(), Method::Where);
        let result = req.result_shape().unwrap();
        assert_eq!(result.name, "WhereSpan");
        assert!(!result.has_length);
        assert_eq!(result.type_params, vec!["T"]);
    }

    #[test]
    fn slicing_a_length_known_shape_keeps_it() {
        let req = SynthesisRequest::new(Shape::span(), Method::Skip);
        let result = req.result_shape().unwrap();
        assert_eq!(result, &Shape::span());

        let select = wrapper("SelectSpan", &["TSource", "TResult"], true);
        let req = SynthesisRequest::new(select.clone(), Method::Take);
        assert_eq!(req.result_shape(), Some(&select));
    }

    #[test]
    fn slicing_without_length_wraps() {
        let filtered = wrapper("WhereSpan", &["T"], false);
        let req = SynthesisRequest::new(filtered, Method::Take);
        let result = req.result_shape().unwrap();
        assert_eq!(result.name, "TakeWhereSpan");
        assert!(!result.has_length);
        assert!(!result.is_view());
    }

    #[test]
    fn reverse_keeps_length() {
        let req = SynthesisRequest::new(Shape::read_only_span(), Method::Reverse);
        let result = req.result_shape().unwrap();
        assert_eq!(result.name, "ReverseSpan");
        assert!(result.has_length);
    }

    #[test]
    fn terminal_operators_have_no_result() {
        for method in [Method::Count, Method::ToList, Method::First, Method::Contains] {
            let req = SynthesisRequest::new(Shape::read_only_span(), method);
            assert!(req.result_shape().is_none());
        }
    }

    #[test]
    fn result_is_memoized() {
        let req = SynthesisRequest::new(Shape::read_only_span(), Method::Where);
        let a = req.result_shape().unwrap() as *const Shape;
        let b = req.result_shape().unwrap() as *const Shape;
        assert_eq!(a, b);
    }
}
