//! Request/response mapping
//!
//! A [`Mapper`] converts between the transport shapes of a resource and its
//! entity. Mappers are pure: no I/O, no failure. Requests reach them only
//! after validation, so every well-typed input has an image.

/// Conversion between an entity and its request/response shapes
///
/// # Type Parameters
///
/// - `E`: The entity type
/// - `Req`: The validated inbound request shape
/// - `Res`: The outbound response shape
///
/// # Example
///
/// ```rust
/// use todo_service::mapper::Mapper;
///
/// struct Note { text: String }
/// struct NoteRequest { text: String }
/// struct NoteResponse { text: String, length: usize }
///
/// struct NoteMapper;
///
/// impl Mapper<Note, NoteRequest, NoteResponse> for NoteMapper {
///     fn to_entity(&self, request: NoteRequest) -> Note {
///         Note { text: request.text }
///     }
///
///     fn to_response(&self, entity: &Note) -> NoteResponse {
///         NoteResponse { text: entity.text.clone(), length: entity.text.len() }
///     }
/// }
///
/// let response = NoteMapper.to_response(&NoteMapper.to_entity(NoteRequest { text: "hi".into() }));
/// assert_eq!(response.length, 2);
/// ```
pub trait Mapper<E, Req, Res>: Send + Sync {
    /// Build a draft entity (no id, default status) from a request
    fn to_entity(&self, request: Req) -> E;

    /// Describe an entity for the caller
    fn to_response(&self, entity: &E) -> Res;

    /// Describe several entities, keeping their order
    fn to_responses(&self, entities: &[E]) -> Vec<Res> {
        entities.iter().map(|e| self.to_response(e)).collect()
    }
}
